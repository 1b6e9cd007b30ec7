//! User management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{UpdateUser, UserDto},
    AppState,
};

use super::AuthenticatedUser;

/// List all users
#[utoipa::path(
    get,
    path = "/api/user",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserDto>),
        (status = 403, description = "SuperUser role required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<UserDto>>> {
    claims.require_super_user()?;
    Ok(Json(state.services.users.list().await?))
}

/// Get user details by ID
#[utoipa::path(
    get,
    path = "/api/user/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserDto),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserDto>> {
    claims.require_member()?;

    state
        .services
        .users
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
}

/// Update a user; members may only edit their own account
#[utoipa::path(
    put,
    path = "/api/user/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserDto),
        (status = 400, description = "Invalid input or username/email taken"),
        (status = 403, description = "Not allowed to edit this user"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateUser>,
) -> AppResult<Json<UserDto>> {
    claims.require_member()?;
    update.validate()?;

    state
        .services
        .users
        .update(&claims, id, update)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/user/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "User still referenced by borrowing requests")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_super_user()?;
    state.services.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        api::router,
        models::user::{Role, User, UserDto},
        repository::{users::MockUsersRepository, Repository},
        test_support::{bearer, bearer_for, empty_request, json_body, json_request, state},
    };

    fn member(id: Uuid) -> User {
        User {
            id,
            username: "reader".to_string(),
            email: "reader@example.com".to_string(),
            role: Role::User,
            password_hash: String::new(),
            refresh_token: String::new(),
            refresh_token_expiry_time: None,
        }
    }

    #[tokio::test]
    async fn only_super_users_list_users() {
        let state = state(Repository::mocked());
        let token = bearer(&state, Role::User);
        let response = router(state)
            .oneshot(empty_request("GET", "/api/user", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn user_list_hides_credentials() {
        let mut users = MockUsersRepository::new();
        users
            .expect_list()
            .returning(|| Ok(vec![member(Uuid::new_v4())]));

        let state = state(Repository::mocked().with_users(users));
        let token = bearer(&state, Role::SuperUser);
        let response = router(state)
            .oneshot(empty_request("GET", "/api/user", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = json_body(response).await;
        assert_eq!(body[0]["username"], "reader");
        assert!(body[0].get("password_hash").is_none());
        assert!(body[0].get("refresh_token").is_none());
    }

    #[tokio::test]
    async fn member_updates_own_account() {
        let id = Uuid::new_v4();
        let mut users = MockUsersRepository::new();
        users.expect_get_by_id().returning(move |_| Ok(Some(member(id))));
        users.expect_username_exists().returning(|_, _| Ok(false));
        users.expect_email_exists().returning(|_, _| Ok(false));
        users.expect_update().returning(|u| Ok(Some(u.clone())));

        let state = state(Repository::mocked().with_users(users));
        let token = bearer_for(&state, id, Role::User);
        let body = json!({ "username": "reader2", "email": "reader2@example.com" });
        let response = router(state)
            .oneshot(json_request("PUT", &format!("/api/user/{}", id), &token, body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let updated: UserDto = json_body(response).await;
        assert_eq!(updated.username, "reader2");
        assert_eq!(updated.role, Role::User);
    }

    #[tokio::test]
    async fn member_cannot_update_another_account() {
        let state = state(Repository::mocked());
        let token = bearer(&state, Role::User);
        let body = json!({ "username": "intruder", "email": "intruder@example.com" });
        let response = router(state)
            .oneshot(json_request(
                "PUT",
                &format!("/api/user/{}", Uuid::new_v4()),
                &token,
                body,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn taken_email_is_rejected_on_update() {
        let id = Uuid::new_v4();
        let mut users = MockUsersRepository::new();
        users.expect_get_by_id().returning(move |_| Ok(Some(member(id))));
        users.expect_username_exists().returning(|_, _| Ok(false));
        users.expect_email_exists().returning(|_, _| Ok(true));
        users.expect_update().never();

        let state = state(Repository::mocked().with_users(users));
        let token = bearer(&state, Role::SuperUser);
        let body = json!({ "username": "reader", "email": "taken@example.com" });
        let response = router(state)
            .oneshot(json_request("PUT", &format!("/api/user/{}", id), &token, body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
