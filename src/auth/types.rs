use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UserModel;

/// JWT claims identifying the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthClaims {
    pub id: String,
    pub email: String,
    pub username: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Request payload for registration. Fields are optional so that missing
/// values surface as 400 validation errors instead of extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Response for register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

/// Response for `GET /api/auth/me`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

impl From<&UserModel> for AuthUser {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

impl From<UserModel> for ProfileResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            avatar: user.avatar,
            bio: user.bio,
            timezone: user.timezone,
            created_at: user.created_at,
        }
    }
}
