use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use super::repository::{JoinRoomResult, RoomRepository};
use crate::event::{EventBus, RoomEventHandler, RoomSubscription};
use crate::shared::AppError;

/// Owns session room lifecycles.
///
/// A room's broadcast channel and subscription task exist exactly while the
/// room has at least one connection. Creation and removal are serialized so a
/// join racing a last leave cannot end up with a room and no channel.
pub struct RoomService {
    repository: Arc<dyn RoomRepository + Send + Sync>,
    event_bus: EventBus,
    subscriber: Arc<dyn RoomEventHandler>,
    subscriptions: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl RoomService {
    pub fn new(
        repository: Arc<dyn RoomRepository + Send + Sync>,
        event_bus: EventBus,
        subscriber: Arc<dyn RoomEventHandler>,
    ) -> Self {
        Self {
            repository,
            event_bus,
            subscriber,
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    /// Adds a connection to a campaign room, opening the room if needed
    #[instrument(skip(self))]
    pub async fn join_room(
        &self,
        room_id: &str,
        connection_id: &str,
    ) -> Result<JoinRoomResult, AppError> {
        let mut subscriptions = self.subscriptions.lock().await;

        let result = self.repository.join_room(room_id, connection_id).await?;

        if result == JoinRoomResult::Created {
            let handle = RoomSubscription::new(
                room_id.to_string(),
                Arc::clone(&self.subscriber),
                self.event_bus.clone(),
            )
            .start()
            .await;
            subscriptions.insert(room_id.to_string(), handle);

            info!(room_id = %room_id, "Room opened");
        }

        debug!(room_id = %room_id, connection_id = %connection_id, result = ?result, "Joined room");
        Ok(result)
    }

    /// Removes a connection from all rooms and closes the rooms left empty
    #[instrument(skip(self))]
    pub async fn leave_all(&self, connection_id: &str) -> Result<Vec<String>, AppError> {
        let mut subscriptions = self.subscriptions.lock().await;

        let emptied = self.repository.leave_all(connection_id).await?;

        for room_id in &emptied {
            self.event_bus.close_room(room_id).await;
            // The task drains and exits once the channel is closed
            subscriptions.remove(room_id);
            info!(room_id = %room_id, "Room closed");
        }

        Ok(emptied)
    }

    pub async fn active_room_count(&self) -> usize {
        self.subscriptions.lock().await.len()
    }
}
