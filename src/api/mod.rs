//! API handlers for the library REST endpoints

pub mod books;
pub mod borrowing_requests;
pub mod categories;
pub mod health;
pub mod login;
pub mod openapi;
pub mod reviews;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{HeaderName, AUTHORIZATION, LOCATION},
        request::Parts,
        StatusCode,
    },
    routing::{get, post},
    Json, Router,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = state.services.tokens.validate_access_token(token.trim())?;
        Ok(AuthenticatedUser(claims))
    }
}

/// 201 response pointing at the new resource
pub type Created<T> = (StatusCode, [(HeaderName, String); 1], Json<T>);

pub(crate) fn created<T>(location: String, body: T) -> Created<T> {
    (StatusCode::CREATED, [(LOCATION, location)], Json(body))
}

/// Build the application router (without the outer tower layers)
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Books
        .route("/book", get(books::list_books).post(books::create_book))
        .route(
            "/book/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Categories
        .route(
            "/category",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/category/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        // Reviews
        .route("/review", get(reviews::list_reviews).post(reviews::create_review))
        .route("/review/book/:book_id", get(reviews::list_book_reviews))
        .route(
            "/review/:id",
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        // Users
        .route("/user", get(users::list_users))
        .route(
            "/user/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Borrowing requests
        .route(
            "/bookborrowingrequest",
            get(borrowing_requests::list_requests).post(borrowing_requests::create_request),
        )
        .route(
            "/bookborrowingrequest/:id",
            get(borrowing_requests::get_request)
                .put(borrowing_requests::update_request)
                .delete(borrowing_requests::delete_request),
        )
        .route(
            "/bookborrowingrequest/:id/approve",
            post(borrowing_requests::approve_request),
        )
        .route(
            "/bookborrowingrequest/:id/reject",
            post(borrowing_requests::reject_request),
        )
        // Authentication
        .route("/login/register", post(login::register))
        .route("/login/login", post(login::login))
        .route("/login/refresh", post(login::refresh));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api)
        .with_state(state)
        .merge(openapi::create_openapi_router())
}
