use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

use super::models::RoomModel;
use crate::shared::AppError;

/// Result of adding a connection to a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRoomResult {
    /// The room did not exist and was created with this connection
    Created,
    /// The connection joined an existing room
    Joined,
    /// The connection was already in the room
    AlreadyJoined,
}

/// Trait for session room membership
#[async_trait]
pub trait RoomRepository {
    async fn join_room(
        &self,
        room_id: &str,
        connection_id: &str,
    ) -> Result<JoinRoomResult, AppError>;

    /// Removes the connection from every room it joined.
    /// Returns the ids of rooms that became empty and were removed.
    async fn leave_all(&self, connection_id: &str) -> Result<Vec<String>, AppError>;

    async fn get_room(&self, room_id: &str) -> Result<Option<RoomModel>, AppError>;

    async fn get_members(&self, room_id: &str) -> Result<Vec<String>, AppError>;
}

/// In-memory room membership
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<String, RoomModel>>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, RoomModel>>, AppError> {
        self.rooms.lock().map_err(|_| AppError::Internal)
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self))]
    async fn join_room(
        &self,
        room_id: &str,
        connection_id: &str,
    ) -> Result<JoinRoomResult, AppError> {
        let mut rooms = self.lock()?;

        let result = match rooms.get_mut(room_id) {
            Some(room) if room.has_connection(connection_id) => JoinRoomResult::AlreadyJoined,
            Some(room) => {
                room.add_connection(connection_id);
                JoinRoomResult::Joined
            }
            None => {
                let mut room = RoomModel::new(room_id.to_string());
                room.add_connection(connection_id);
                rooms.insert(room_id.to_string(), room);
                JoinRoomResult::Created
            }
        };

        debug!(room_id = %room_id, result = ?result, "Connection joined room");
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn leave_all(&self, connection_id: &str) -> Result<Vec<String>, AppError> {
        let mut rooms = self.lock()?;

        let mut emptied = Vec::new();
        for room in rooms.values_mut() {
            if room.remove_connection(connection_id) && room.is_empty() {
                emptied.push(room.id.clone());
            }
        }
        for room_id in &emptied {
            rooms.remove(room_id);
        }

        debug!(connection_id = %connection_id, emptied = emptied.len(), "Connection left rooms");
        Ok(emptied)
    }

    async fn get_room(&self, room_id: &str) -> Result<Option<RoomModel>, AppError> {
        Ok(self.lock()?.get(room_id).cloned())
    }

    async fn get_members(&self, room_id: &str) -> Result<Vec<String>, AppError> {
        Ok(self
            .lock()?
            .get(room_id)
            .map(|room| room.connection_ids.iter().cloned().collect())
            .unwrap_or_default())
    }
}
