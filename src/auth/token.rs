use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::{debug, instrument};

use super::types::AuthClaims;
use crate::config::AppConfig;
use crate::shared::AppError;

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub expiration_days: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, expiration_days: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_days,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.jwt_secret.clone(), config.jwt_expiration_days)
    }

    /// Creates a signed token carrying the user's identity
    #[instrument(skip(self, email, username))]
    pub fn create_token(
        &self,
        user_id: &str,
        email: &str,
        username: &str,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::days(self.expiration_days)).timestamp() as usize;

        debug!(
            expiration_days = self.expiration_days,
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = AuthClaims {
            id: user_id.to_string(),
            email: email.to_string(),
            username: username.to_string(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::Internal
        })
    }

    /// Validates a JWT token and returns the claims if valid
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<AuthClaims, AppError> {
        decode::<AuthClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(
                user_id = %data.claims.id,
                username = %data.claims.username,
                exp = data.claims.exp,
                "JWT token decoded successfully"
            );
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Unauthorized("Token expired".to_string()),
                _ => AppError::Unauthorized("Invalid token".to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_validate_token() {
        let config = TokenConfig::new("test-secret", 7);

        let token = config
            .create_token("user-1", "ana@example.com", "ana")
            .unwrap();
        assert!(!token.is_empty());

        let claims = config.validate_token(&token).unwrap();
        assert_eq!(claims.id, "user-1");
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.username, "ana");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_invalid_token() {
        let config = TokenConfig::new("test-secret", 7);
        let result = config.validate_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::Unauthorized(msg)) if msg == "Invalid token"));
    }

    #[test]
    fn test_token_with_different_secret() {
        let issuer = TokenConfig::new("secret-a", 7);
        let verifier = TokenConfig::new("secret-b", 7);

        let token = issuer.create_token("user-1", "a@b.c", "ana").unwrap();

        assert!(issuer.validate_token(&token).is_ok());
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        // Expired well past the default 60s leeway
        let config = TokenConfig::new("test-secret", -1);
        let token = config.create_token("user-1", "a@b.c", "ana").unwrap();

        let result = config.validate_token(&token);
        assert!(matches!(result, Err(AppError::Unauthorized(msg)) if msg == "Token expired"));
    }
}
