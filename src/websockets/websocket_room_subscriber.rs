use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::{
    event::{RoomEvent, RoomEventError, RoomEventHandler},
    room::RoomRepository,
    websockets::{connection_manager::ConnectionManager, messages::WebSocketMessage},
};

/// Delivers room events to every WebSocket connection joined to the room,
/// the sender's own connection included.
pub struct WebSocketRoomSubscriber {
    rooms: Arc<dyn RoomRepository + Send + Sync>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl WebSocketRoomSubscriber {
    pub fn new(
        rooms: Arc<dyn RoomRepository + Send + Sync>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            rooms,
            connection_manager,
        }
    }
}

#[async_trait]
impl RoomEventHandler for WebSocketRoomSubscriber {
    async fn handle_room_event(
        &self,
        room_id: &str,
        event: RoomEvent,
    ) -> Result<(), RoomEventError> {
        match event {
            RoomEvent::MessageSent { message } => {
                let members = self
                    .rooms
                    .get_members(room_id)
                    .await
                    .map_err(|e| RoomEventError::HandlerError(e.to_string()))?;

                if members.is_empty() {
                    return Err(RoomEventError::RoomNotFound(room_id.to_string()));
                }

                let frame = WebSocketMessage::receive_message(&message)?.to_json()?;
                self.connection_manager
                    .send_to_connections(&members, &frame)
                    .await;

                debug!(
                    room_id = %room_id,
                    kind = ?message.kind,
                    recipients = members.len(),
                    "Message relayed"
                );
                Ok(())
            }
        }
    }

    fn handler_name(&self) -> &'static str {
        "WebSocketRoomSubscriber"
    }
}
