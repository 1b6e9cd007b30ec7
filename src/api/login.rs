//! Anonymous authentication endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::user::{LoginRequest, LoginResponse, RefreshRequest, RegistrationRequest, RegistrationResponse},
    AppState,
};

/// Register a new member account
#[utoipa::path(
    post,
    path = "/api/login/register",
    tag = "auth",
    request_body = RegistrationRequest,
    responses(
        (status = 200, description = "Account created", body = RegistrationResponse),
        (status = 400, description = "Invalid input, or username/email already in use")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegistrationRequest>,
) -> AppResult<Json<RegistrationResponse>> {
    Ok(Json(state.services.users.register(request).await?))
}

/// Authenticate user and return an access/refresh token pair
#[utoipa::path(
    post,
    path = "/api/login/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    Ok(Json(state.services.users.login(request).await?))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/api/login/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens rotated", body = LoginResponse),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> AppResult<Json<LoginResponse>> {
    Ok(Json(state.services.users.refresh(request).await?))
}
