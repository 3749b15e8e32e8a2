use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    password::{hash_password, verify_password},
    token::TokenConfig,
    types::{AuthClaims, AuthResponse, AuthUser, LoginRequest, ProfileResponse, RegisterRequest},
};
use crate::shared::{non_empty, AppError};
use crate::user::repository::{EMAIL_TAKEN, USERNAME_TAKEN};
use crate::user::{UserModel, UserRepository};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Service for registration, login and token validation
pub struct AuthService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl AuthService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>, token_config: TokenConfig) -> Self {
        Self {
            repository,
            token_config,
        }
    }

    /// Registers a user and returns a token for immediate login
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        let (email, username, password) = match (
            non_empty(&request.email),
            non_empty(&request.username),
            non_empty(&request.password),
        ) {
            (Some(email), Some(username), Some(password)) => (email, username, password),
            _ => {
                return Err(AppError::BadRequest(
                    "Email, username and password are required".to_string(),
                ))
            }
        };

        if self.repository.find_by_email(email).await?.is_some() {
            warn!(email = %email, "Registration rejected, email already registered");
            return Err(AppError::BadRequest(EMAIL_TAKEN.to_string()));
        }

        if self.repository.find_by_username(username).await?.is_some() {
            warn!(username = %username, "Registration rejected, username already taken");
            return Err(AppError::BadRequest(USERNAME_TAKEN.to_string()));
        }

        let password_hash = hash_password(password)?;
        let timezone = non_empty(&request.timezone).map(str::to_string);
        let user = UserModel::new(
            email.to_string(),
            username.to_string(),
            password_hash,
            timezone,
        );
        self.repository.create_user(&user).await?;

        info!(user_id = %user.id, username = %user.username, "User registered");

        self.issue(&user)
    }

    /// Exchanges email and password for a token
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        let (email, password) = match (non_empty(&request.email), non_empty(&request.password)) {
            (Some(email), Some(password)) => (email, password),
            _ => {
                return Err(AppError::BadRequest(
                    "Email and password are required".to_string(),
                ))
            }
        };

        let user = match self.repository.find_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!("Login attempt for unknown email");
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        info!(user_id = %user.id, "User logged in");

        self.issue(&user)
    }

    /// Loads the profile of the authenticated user
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: &str) -> Result<ProfileResponse, AppError> {
        self.repository
            .get_user(user_id)
            .await?
            .map(ProfileResponse::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Validates a bearer token
    pub fn validate_token(&self, token: &str) -> Result<AuthClaims, AppError> {
        self.token_config.validate_token(token)
    }

    fn issue(&self, user: &UserModel) -> Result<AuthResponse, AppError> {
        let token = self
            .token_config
            .create_token(&user.id, &user.email, &user.username)?;

        Ok(AuthResponse {
            token,
            user: AuthUser::from(user),
        })
    }
}
