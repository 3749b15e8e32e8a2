pub use models::RoomModel;
pub use repository::{InMemoryRoomRepository, JoinRoomResult, RoomRepository};
pub use service::RoomService;

pub mod models;
pub mod repository;
pub mod service;
