//! JWT access tokens and opaque refresh tokens

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{User, UserClaims},
};

#[derive(Clone)]
pub struct TokenService {
    config: AuthConfig,
}

impl TokenService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Signed, time-limited token carrying the user's id, name and role
    pub fn generate_access_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.config.access_token_expiration_minutes);

        let claims = UserClaims {
            sub: user.id,
            name: user.username.clone(),
            role: user.role,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        self.encode_claims(&claims)
    }

    /// Random refresh token, unrelated to any access token
    pub fn generate_refresh_token(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill(&mut bytes);
        STANDARD.encode(bytes)
    }

    pub fn refresh_token_lifetime(&self) -> Duration {
        Duration::days(self.config.refresh_token_expiration_days)
    }

    /// Full validation: signature, issuer, audience and expiry
    pub fn validate_access_token(&self, token: &str) -> AppResult<UserClaims> {
        self.decode_claims(token, true)
    }

    /// Recover the claims of a token whose only flaw may be that it expired
    pub fn principal_from_expired_token(&self, token: &str) -> AppResult<UserClaims> {
        self.decode_claims(token, false)
    }

    fn encode_claims(&self, claims: &UserClaims) -> AppResult<String> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn decode_claims(&self, token: &str, validate_exp: bool) -> AppResult<UserClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = validate_exp;

        decode::<UserClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::Authentication(format!("Invalid token: {}", e)))
    }
}
