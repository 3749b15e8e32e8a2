use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::auth::{service::AuthService, TokenConfig};
use crate::campaign::{repository::CampaignRepository, service::CampaignService};
use crate::character::{repository::CharacterRepository, service::CharacterService};
use crate::config::AppConfig;
use crate::event::EventBus;
use crate::room::{repository::InMemoryRoomRepository, service::RoomService};
use crate::user::repository::UserRepository;
use crate::websockets::{ConnectionManager, InMemoryConnectionManager, WebSocketRoomSubscriber};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub token_config: TokenConfig,
    pub auth_service: Arc<AuthService>,
    pub campaign_service: Arc<CampaignService>,
    pub character_service: Arc<CharacterService>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub room_service: Arc<RoomService>,
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires services on top of the given repositories
    pub fn new(
        config: &AppConfig,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        campaign_repository: Arc<dyn CampaignRepository + Send + Sync>,
        character_repository: Arc<dyn CharacterRepository + Send + Sync>,
    ) -> Self {
        let token_config = TokenConfig::from_config(config);

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&user_repository),
            token_config.clone(),
        ));
        let campaign_service = Arc::new(CampaignService::new(
            Arc::clone(&campaign_repository),
            Arc::clone(&character_repository),
            Arc::clone(&user_repository),
        ));
        let character_service = Arc::new(CharacterService::new(
            character_repository,
            campaign_repository,
            user_repository,
        ));

        // Realtime relay: room membership is process-local
        let event_bus = EventBus::new(config.room_channel_capacity);
        let connection_manager: Arc<dyn ConnectionManager> =
            Arc::new(InMemoryConnectionManager::new());
        let room_repository = Arc::new(InMemoryRoomRepository::new());
        let subscriber = Arc::new(WebSocketRoomSubscriber::new(
            room_repository.clone(),
            Arc::clone(&connection_manager),
        ));
        let room_service = Arc::new(RoomService::new(
            room_repository,
            event_bus.clone(),
            subscriber,
        ));

        Self {
            token_config,
            auth_service,
            campaign_service,
            character_service,
            connection_manager,
            room_service,
            event_bus,
        }
    }

    /// State backed entirely by in-memory repositories (development and tests)
    pub fn in_memory(config: &AppConfig) -> Self {
        use crate::campaign::repository::InMemoryCampaignRepository;
        use crate::character::repository::InMemoryCharacterRepository;
        use crate::user::repository::InMemoryUserRepository;

        Self::new(
            config,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryCampaignRepository::new()),
            Arc::new(InMemoryCharacterRepository::new()),
        )
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::DatabaseError(msg) => {
                // Details stay in the logs, clients get a generic message
                error!(error = %msg, "Database error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Maps a unique or primary key violation to a 400 whose message is picked
/// from the violated constraint's name. Any other failure is a database error.
pub fn map_unique_violation(
    e: sqlx::Error,
    message_for: impl FnOnce(Option<&str>) -> String,
) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::BadRequest(message_for(db.constraint()))
        }
        _ => AppError::DatabaseError(e.to_string()),
    }
}

/// Deserializes a field that distinguishes "absent" from "explicit null".
///
/// Use with `#[serde(default, deserialize_with = "double_option")]` on an
/// `Option<Option<T>>`: absent → `None`, `null` → `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Treats `None` and empty strings the same way, mirroring form submissions
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
