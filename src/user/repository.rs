use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::shared::{map_unique_violation, AppError};

pub const EMAIL_TAKEN: &str = "Email already registered";
pub const USERNAME_TAKEN: &str = "Username already taken";

/// Message for a violated unique constraint of the users table
fn duplicate_user_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("users_email_key") => EMAIL_TAKEN,
        Some("users_username_key") => USERNAME_TAKEN,
        _ => "User already exists",
    }
    .to_string()
}

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError>;
    async fn get_users(&self, user_ids: &[String]) -> Result<Vec<UserModel>, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, UserModel>>, AppError> {
        self.users.lock().map_err(|_| AppError::Internal)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, username = %user.username, "Creating user in memory");

        let mut users = self.lock()?;
        // Mirrors the unique constraints of the users table
        let conflict = users.values().find_map(|existing| {
            if existing.email == user.email {
                Some("users_email_key")
            } else if existing.username == user.username {
                Some("users_username_key")
            } else if existing.id == user.id {
                Some("users_pkey")
            } else {
                None
            }
        });
        if let Some(constraint) = conflict {
            warn!(user_id = %user.id, constraint, "User violates a unique constraint in memory");
            return Err(AppError::BadRequest(duplicate_user_message(Some(constraint))));
        }
        users.insert(user.id.clone(), user.clone());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        Ok(self.lock()?.get(user_id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        Ok(self.lock()?.values().find(|u| u.email == email).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        Ok(self
            .lock()?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    #[instrument(skip(self))]
    async fn get_users(&self, user_ids: &[String]) -> Result<Vec<UserModel>, AppError> {
        let users = self.lock()?;
        Ok(user_ids
            .iter()
            .filter_map(|id| users.get(id).cloned())
            .collect())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str =
    "id, email, username, password_hash, avatar, bio, timezone, created_at";

fn user_from_row(row: &PgRow) -> UserModel {
    UserModel {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        avatar: row.get("avatar"),
        bio: row.get("bio"),
        timezone: row.get("timezone"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, username = %user.username, "Creating user in database");

        sqlx::query(
            "INSERT INTO users (id, email, username, password_hash, avatar, bio, timezone, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(&user.bio)
        .bind(&user.timezone)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create user in database");
            map_unique_violation(e, duplicate_user_message)
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    #[instrument(skip(self))]
    async fn get_users(&self, user_ids: &[String]) -> Result<Vec<UserModel>, AppError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str, username: &str) -> UserModel {
        UserModel::new(
            email.to_string(),
            username.to_string(),
            "hash".to_string(),
            None,
        )
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = InMemoryUserRepository::new();
        let ana = user("ana@example.com", "ana");
        repo.create_user(&ana).await.unwrap();

        let by_id = repo.get_user(&ana.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "ana");

        let by_email = repo.find_by_email("ana@example.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, ana.id);

        let by_username = repo.find_by_username("ana").await.unwrap();
        assert_eq!(by_username.unwrap().id, ana.id);

        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(&user("ana@example.com", "ana")).await.unwrap();

        let result = repo.create_user(&user("ana@example.com", "other")).await;
        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == EMAIL_TAKEN));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(&user("ana@example.com", "ana")).await.unwrap();

        let result = repo.create_user(&user("other@example.com", "ana")).await;
        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == USERNAME_TAKEN));
    }

    #[test]
    fn test_duplicate_user_message_by_constraint() {
        assert_eq!(duplicate_user_message(Some("users_email_key")), EMAIL_TAKEN);
        assert_eq!(duplicate_user_message(Some("users_username_key")), USERNAME_TAKEN);
        assert_eq!(duplicate_user_message(None), "User already exists");
    }

    #[tokio::test]
    async fn test_get_users_skips_unknown_ids() {
        let repo = InMemoryUserRepository::new();
        let ana = user("ana@example.com", "ana");
        let bia = user("bia@example.com", "bia");
        repo.create_user(&ana).await.unwrap();
        repo.create_user(&bia).await.unwrap();

        let found = repo
            .get_users(&[ana.id.clone(), "missing".to_string(), bia.id.clone()])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }
}
