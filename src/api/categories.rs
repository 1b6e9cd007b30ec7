//! Category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::category::{CategoryDto, CategoryInput},
    AppState,
};

use super::{created, AuthenticatedUser, Created};

#[utoipa::path(
    get,
    path = "/api/category",
    tag = "categories",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All categories", body = Vec<CategoryDto>)
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<CategoryDto>>> {
    claims.require_member()?;
    Ok(Json(state.services.categories.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/category/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = CategoryDto),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CategoryDto>> {
    claims.require_member()?;

    state
        .services
        .categories
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
}

#[utoipa::path(
    post,
    path = "/api/category",
    tag = "categories",
    security(("bearer_auth" = [])),
    request_body = CategoryInput,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 403, description = "SuperUser role required")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(input): Json<CategoryInput>,
) -> AppResult<Created<CategoryDto>> {
    claims.require_super_user()?;
    input.validate()?;

    let category = state.services.categories.create(input).await?;
    Ok(created(format!("/api/category/{}", category.id), category))
}

#[utoipa::path(
    put,
    path = "/api/category/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category renamed", body = CategoryDto),
        (status = 404, description = "Category not found")
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<CategoryDto>> {
    claims.require_super_user()?;
    input.validate()?;

    state
        .services
        .categories
        .update(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
}

/// Delete an empty category
#[utoipa::path(
    delete,
    path = "/api/category/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Category still has books")
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_super_user()?;
    state.services.categories.delete(id).await?;
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
        models::{category::Category, user::Role, CategoryDto},
        repository::{categories::MockCategoriesRepository, Repository},
        test_support::{bearer, empty_request, json_body, json_request, state},
    };

    #[tokio::test]
    async fn members_list_categories() {
        let mut categories = MockCategoriesRepository::new();
        categories.expect_list().returning(|| {
            Ok(vec![Category {
                id: Uuid::new_v4(),
                name: "Science".to_string(),
            }])
        });

        let state = state(Repository::mocked().with_categories(categories));
        let token = bearer(&state, Role::User);
        let response = router(state)
            .oneshot(empty_request("GET", "/api/category", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Vec<CategoryDto> = json_body(response).await;
        assert_eq!(body[0].name, "Science");
    }

    #[tokio::test]
    async fn members_cannot_rename_categories() {
        let state = state(Repository::mocked());
        let token = bearer(&state, Role::User);
        let response = router(state)
            .oneshot(json_request(
                "PUT",
                &format!("/api/category/{}", Uuid::new_v4()),
                &token,
                json!({ "name": "History" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn category_with_books_is_not_deleted() {
        let id = Uuid::new_v4();
        let mut categories = MockCategoriesRepository::new();
        categories.expect_get_by_id().returning(move |_| {
            Ok(Some(Category {
                id,
                name: "Science".to_string(),
            }))
        });
        categories.expect_count_books().returning(|_| Ok(4));
        categories.expect_delete().never();

        let state = state(Repository::mocked().with_categories(categories));
        let token = bearer(&state, Role::SuperUser);
        let response = router(state)
            .oneshot(empty_request("DELETE", &format!("/api/category/{}", id), &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
