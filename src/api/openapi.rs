//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrowing_requests, categories, health, login, reviews, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library API",
        version = "1.0.0",
        description = "Library management REST API: catalog, reviews and borrowing requests"
    ),
    paths(
        health::health_check,
        // Auth
        login::register,
        login::login,
        login::refresh,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Categories
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        // Reviews
        reviews::list_reviews,
        reviews::list_book_reviews,
        reviews::get_review,
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
        // Users
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        // Borrowing requests
        borrowing_requests::list_requests,
        borrowing_requests::get_request,
        borrowing_requests::create_request,
        borrowing_requests::update_request,
        borrowing_requests::delete_request,
        borrowing_requests::approve_request,
        borrowing_requests::reject_request,
    ),
    components(
        schemas(
            crate::models::book::BookDto,
            crate::models::book::BookInput,
            crate::models::category::CategoryDto,
            crate::models::category::CategoryInput,
            crate::models::review::ReviewDto,
            crate::models::review::CreateReview,
            crate::models::review::UpdateReview,
            crate::models::user::Role,
            crate::models::user::UserDto,
            crate::models::user::UpdateUser,
            crate::models::user::RegistrationRequest,
            crate::models::user::RegistrationResponse,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::user::RefreshRequest,
            crate::models::borrowing_request::RequestStatus,
            crate::models::borrowing_request::BorrowingRequestDto,
            crate::models::borrowing_request::BorrowingRequestDetailDto,
            crate::models::borrowing_request::CreateBorrowingRequest,
            crate::models::borrowing_request::CreateBorrowingRequestDetail,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check"),
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "books", description = "Book catalog"),
        (name = "categories", description = "Book categories"),
        (name = "reviews", description = "Book reviews"),
        (name = "users", description = "User management"),
        (name = "borrowing", description = "Book borrowing requests")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
