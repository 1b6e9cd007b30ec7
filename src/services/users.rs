//! Registration, login and user management service

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use subtle::ConstantTimeEq;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{
        LoginRequest, LoginResponse, RefreshRequest, RegistrationRequest, RegistrationResponse,
        Role, UpdateUser, User, UserClaims, UserDto,
    },
    repository::UsersRepository,
    services::tokens::TokenService,
};

const INVALID_CREDENTIALS: &str = "Invalid username or password.";

#[derive(Clone)]
pub struct UsersService {
    users: Arc<dyn UsersRepository>,
    tokens: TokenService,
}

impl UsersService {
    pub fn new(users: Arc<dyn UsersRepository>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub async fn list(&self) -> AppResult<Vec<UserDto>> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserDto>> {
        Ok(self.users.get_by_id(id).await?.map(UserDto::from))
    }

    /// Members may only edit their own record and never their role
    pub async fn update(
        &self,
        caller: &UserClaims,
        id: Uuid,
        update: UpdateUser,
    ) -> AppResult<Option<UserDto>> {
        if !caller.is_super_user() {
            if caller.user_id() != id {
                return Err(AppError::Authorization(
                    "You may only update your own account".to_string(),
                ));
            }
            if update.role.is_some_and(|role| role != caller.role) {
                return Err(AppError::Authorization(
                    "Only a SuperUser may change roles".to_string(),
                ));
            }
        }

        let Some(mut user) = self.users.get_by_id(id).await? else {
            return Ok(None);
        };

        if self.users.username_exists(&update.username, Some(id)).await? {
            return Err(AppError::BadRequest("Username is already in use.".to_string()));
        }
        if self.users.email_exists(&update.email, Some(id)).await? {
            return Err(AppError::BadRequest("Email is already in use.".to_string()));
        }

        user.apply(update);
        Ok(self.users.update(&user).await?.map(UserDto::from))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.users.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Create a member account with the `User` role
    pub async fn register(&self, request: RegistrationRequest) -> AppResult<RegistrationResponse> {
        request.validate()?;

        if self.users.username_exists(&request.username, None).await? {
            return Err(AppError::BadRequest("Username is already in use.".to_string()));
        }
        if self.users.email_exists(&request.email, None).await? {
            return Err(AppError::BadRequest("Email is already in use.".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: request.username,
            email: request.email,
            role: Role::User,
            password_hash: Self::hash_password(&request.password)?,
            refresh_token: String::new(),
            refresh_token_expiry_time: None,
        };

        let created = self.users.create(&user).await?;
        tracing::info!(user_id = %created.id, username = %created.username, "User registered");
        Ok(created.into())
    }

    /// Check credentials and issue an access/refresh token pair
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let user = self
            .users
            .get_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !Self::verify_password(&user, &request.password)? {
            tracing::warn!(username = %request.username, "Failed login attempt");
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let response = self.issue_tokens(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(response)
    }

    /// Rotate the token pair of a user whose access token may have expired
    pub async fn refresh(&self, request: RefreshRequest) -> AppResult<LoginResponse> {
        let claims = self.tokens.principal_from_expired_token(&request.access_token)?;
        let invalid = || AppError::Authentication("Invalid refresh token.".to_string());

        let user = self
            .users
            .get_by_id(claims.user_id())
            .await?
            .ok_or_else(invalid)?;

        let expired = user
            .refresh_token_expiry_time
            .map_or(true, |expiry| expiry <= Utc::now());
        let matches: bool = user
            .refresh_token
            .as_bytes()
            .ct_eq(request.refresh_token.as_bytes())
            .into();
        if user.refresh_token.is_empty() || !matches || expired {
            return Err(invalid());
        }

        self.issue_tokens(&user).await
    }

    async fn issue_tokens(&self, user: &User) -> AppResult<LoginResponse> {
        let access_token = self.tokens.generate_access_token(user)?;
        let refresh_token = self.tokens.generate_refresh_token();
        let expires_at = Utc::now() + self.tokens.refresh_token_lifetime();

        self.users
            .update_refresh_token(user.id, &refresh_token, expires_at)
            .await?;

        Ok(LoginResponse {
            access_token,
            refresh_token,
            user_id: user.id,
        })
    }

    fn verify_password(user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
