use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{bus::EventBus, room_handler::RoomEventHandler};

/// Routes one room's events to a handler on a background task
pub struct RoomSubscription {
    room_id: String,
    handler: Arc<dyn RoomEventHandler>,
    event_bus: EventBus,
}

impl RoomSubscription {
    pub fn new(room_id: String, handler: Arc<dyn RoomEventHandler>, event_bus: EventBus) -> Self {
        Self {
            room_id,
            handler,
            event_bus,
        }
    }

    /// Subscribes before spawning, so events emitted after this returns are
    /// never missed. The task ends when the room channel is closed.
    pub async fn start(self) -> JoinHandle<()> {
        let room_id = self.room_id.clone();
        let handler_name = self.handler.handler_name();

        info!(
            room_id = %room_id,
            handler = handler_name,
            "Starting room subscription"
        );

        let mut receiver = self.event_bus.subscribe_to_room(&room_id).await;

        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        debug!(
                            room_id = %room_id,
                            handler = handler_name,
                            event = ?event,
                            "Received room event"
                        );

                        if let Err(e) = self.handler.handle_room_event(&room_id, event).await {
                            warn!(
                                room_id = %room_id,
                                handler = handler_name,
                                error = %e,
                                "Room event handler failed"
                            );
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            room_id = %room_id,
                            handler = handler_name,
                            skipped,
                            "Room subscription lagged, events skipped"
                        );
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            info!(
                room_id = %room_id,
                handler = handler_name,
                "Room subscription ended"
            );
        })
    }
}
