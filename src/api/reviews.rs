//! Book review endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::review::{CreateReview, ReviewDto, UpdateReview},
    AppState,
};

use super::{created, AuthenticatedUser, Created};

#[utoipa::path(
    get,
    path = "/api/review",
    tag = "reviews",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All reviews", body = Vec<ReviewDto>)
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<ReviewDto>>> {
    claims.require_member()?;
    Ok(Json(state.services.reviews.list().await?))
}

/// Reviews written for one book
#[utoipa::path(
    get,
    path = "/api/review/book/{book_id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(("book_id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Reviews of the book", body = Vec<ReviewDto>)
    )
)]
pub async fn list_book_reviews(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<Vec<ReviewDto>>> {
    claims.require_member()?;
    Ok(Json(state.services.reviews.list_by_book(book_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/review/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review", body = ReviewDto),
        (status = 404, description = "Review not found")
    )
)]
pub async fn get_review(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ReviewDto>> {
    claims.require_member()?;

    state
        .services
        .reviews
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Review {} not found", id)))
}

#[utoipa::path(
    post,
    path = "/api/review",
    tag = "reviews",
    security(("bearer_auth" = [])),
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review created", body = ReviewDto),
        (status = 400, description = "Invalid rating or unknown book")
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(input): Json<CreateReview>,
) -> AppResult<Created<ReviewDto>> {
    claims.require_member()?;
    input.validate()?;

    let review = state.services.reviews.create(claims.user_id(), input).await?;
    Ok(created(format!("/api/review/{}", review.id), review))
}

#[utoipa::path(
    put,
    path = "/api/review/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = UpdateReview,
    responses(
        (status = 200, description = "Review updated", body = ReviewDto),
        (status = 404, description = "Review not found")
    )
)]
pub async fn update_review(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateReview>,
) -> AppResult<Json<ReviewDto>> {
    claims.require_member()?;
    input.validate()?;

    state
        .services
        .reviews
        .update(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Review {} not found", id)))
}

#[utoipa::path(
    delete,
    path = "/api/review/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted")
    )
)]
pub async fn delete_review(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_member()?;
    state.services.reviews.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
