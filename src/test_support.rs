//! Shared fixtures for router tests

use std::sync::Arc;

use axum::{body::Body, response::Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    config::{AppConfig, AuthConfig},
    models::user::{Role, User},
    repository::Repository,
    services::Services,
    AppState,
};

pub fn config() -> AppConfig {
    AppConfig {
        auth: AuthConfig {
            jwt_secret: "router-test-secret".to_string(),
            ..AuthConfig::default()
        },
        ..AppConfig::default()
    }
}

pub fn state(repository: Repository) -> AppState {
    let config = config();
    let services = Services::new(repository, &config);
    AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    }
}

/// `Authorization` header value for a fresh user with `role`
pub fn bearer(state: &AppState, role: Role) -> String {
    bearer_for(state, Uuid::new_v4(), role)
}

pub fn bearer_for(state: &AppState, id: Uuid, role: Role) -> String {
    let user = User {
        id,
        username: format!("{}-account", role.as_str().to_lowercase()),
        email: "someone@example.com".to_string(),
        role,
        password_hash: String::new(),
        refresh_token: String::new(),
        refresh_token_expiry_time: None,
    };
    let token = state
        .services
        .tokens
        .generate_access_token(&user)
        .expect("token");
    format!("Bearer {}", token)
}

pub async fn json_body<T: DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub fn json_request(method: &str, uri: &str, token: &str, body: serde_json::Value) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::AUTHORIZATION, token)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn empty_request(method: &str, uri: &str, token: &str) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::AUTHORIZATION, token)
        .body(Body::empty())
        .expect("request")
}
