//! Book borrowing request endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::borrowing_request::{BorrowingRequestDto, CreateBorrowingRequest},
    AppState,
};

use super::{created, AuthenticatedUser, Created};

#[utoipa::path(
    get,
    path = "/api/bookborrowingrequest",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All borrowing requests", body = Vec<BorrowingRequestDto>)
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowingRequestDto>>> {
    claims.require_member()?;
    Ok(Json(state.services.borrowing_requests.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/bookborrowingrequest/{id}",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Borrowing request ID")),
    responses(
        (status = 200, description = "Borrowing request with its books", body = BorrowingRequestDto),
        (status = 404, description = "Borrowing request not found")
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BorrowingRequestDto>> {
    claims.require_member()?;

    state
        .services
        .borrowing_requests
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Borrowing request {} not found", id)))
}

/// Submit a borrowing request
#[utoipa::path(
    post,
    path = "/api/bookborrowingrequest",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    request_body = CreateBorrowingRequest,
    responses(
        (status = 201, description = "Request submitted", body = BorrowingRequestDto),
        (status = 400, description = "Monthly quota reached, date outside this month, too many books or duplicate book"),
        (status = 403, description = "User role required")
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(input): Json<CreateBorrowingRequest>,
) -> AppResult<Created<BorrowingRequestDto>> {
    claims.require_user()?;

    let request = state
        .services
        .borrowing_requests
        .add(claims.user_id(), input)
        .await?;
    Ok(created(
        format!("/api/bookborrowingrequest/{}", request.id),
        request,
    ))
}

/// Replace a borrowing request and its books
#[utoipa::path(
    put,
    path = "/api/bookborrowingrequest/{id}",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Borrowing request ID")),
    request_body = BorrowingRequestDto,
    responses(
        (status = 204, description = "Request updated"),
        (status = 400, description = "Id mismatch or too many books"),
        (status = 404, description = "Borrowing request not found")
    )
)]
pub async fn update_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<BorrowingRequestDto>,
) -> AppResult<StatusCode> {
    claims.require_user()?;
    state.services.borrowing_requests.update(id, dto).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/bookborrowingrequest/{id}",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Borrowing request ID")),
    responses(
        (status = 204, description = "Request deleted")
    )
)]
pub async fn delete_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_user()?;
    state.services.borrowing_requests.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Approve a request; the caller is recorded as approver
#[utoipa::path(
    post,
    path = "/api/bookborrowingrequest/{id}/approve",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Borrowing request ID")),
    responses(
        (status = 204, description = "Request approved"),
        (status = 403, description = "SuperUser role required")
    )
)]
pub async fn approve_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_super_user()?;
    state
        .services
        .borrowing_requests
        .approve(id, claims.user_id())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reject a request; the caller is recorded as approver
#[utoipa::path(
    post,
    path = "/api/bookborrowingrequest/{id}/reject",
    tag = "borrowing",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Borrowing request ID")),
    responses(
        (status = 204, description = "Request rejected"),
        (status = 403, description = "SuperUser role required")
    )
)]
pub async fn reject_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_super_user()?;
    state
        .services
        .borrowing_requests
        .reject(id, claims.user_id())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
