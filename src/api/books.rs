//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookDto, BookInput},
    AppState,
};

use super::{created, AuthenticatedUser, Created};

/// List all books
#[utoipa::path(
    get,
    path = "/api/book",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All books", body = Vec<BookDto>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookDto>>> {
    claims.require_member()?;
    Ok(Json(state.services.books.list().await?))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/api/book/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book", body = BookDto),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookDto>> {
    claims.require_member()?;

    state
        .services
        .books
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/api/book",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = BookDto),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "SuperUser role required")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(input): Json<BookInput>,
) -> AppResult<Created<BookDto>> {
    claims.require_super_user()?;
    input.validate()?;

    let book = state.services.books.create(input).await?;
    Ok(created(format!("/api/book/{}", book.id), book))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/api/book/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = BookDto),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<BookInput>,
) -> AppResult<Json<BookDto>> {
    claims.require_super_user()?;
    input.validate()?;

    state
        .services
        .books
        .update(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
}

/// Remove a book that is not currently borrowed
#[utoipa::path(
    delete,
    path = "/api/book/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 400, description = "Book is borrowed"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_super_user()?;
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
