// Library crate for the Let's Roll campaign server
// This file exposes the public API for the binary and integration tests

pub mod auth;
pub mod campaign;
pub mod character;
pub mod config;
pub mod dice;
pub mod event;
pub mod health;
pub mod room;
pub mod routes;
pub mod shared;
pub mod user;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use event::{EventBus, RoomEvent, RoomSubscription};
pub use room::{RoomModel, RoomRepository, RoomService};
pub use routes::{build_app, build_router};
pub use shared::{AppError, AppState};
pub use websockets::{
    ChatMessage, ConnectionManager, MessageHandler, MessageKind, MessageType, WebSocketMessage,
    WebSocketRoomSubscriber, WebsocketReceiveHandler,
};
