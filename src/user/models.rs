use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// Database model for users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: String, // UUID v4 as string
    pub email: String,
    pub username: String,
    pub password_hash: String, // argon2id PHC string
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    /// Creates a new user model with generated ID and timestamp
    pub fn new(
        email: String,
        username: String,
        password_hash: String,
        timezone: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            username,
            password_hash,
            avatar: None,
            bio: None,
            timezone: timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            created_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Public projection of a user embedded in campaign and character responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub avatar: Option<String>,
}
