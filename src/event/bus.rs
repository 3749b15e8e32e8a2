use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::RoomEvent;

/// Event bus for distributing room events throughout the application
#[derive(Debug, Clone)]
pub struct EventBus {
    /// Room-specific event channels: room_id -> sender
    room_channels: Arc<RwLock<HashMap<String, broadcast::Sender<RoomEvent>>>>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new event bus whose room channels buffer `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            room_channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Emits an event to all subscribers of a specific room.
    ///
    /// Rooms without a channel have no members, so the event is dropped.
    /// Returns the number of receivers that got the event.
    pub async fn emit_to_room(&self, room_id: &str, event: RoomEvent) -> usize {
        let room_channels = self.room_channels.read().await;

        let Some(sender) = room_channels.get(room_id) else {
            debug!(room_id = %room_id, "No room channel, dropping event");
            return 0;
        };

        match sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    room_id = %room_id,
                    receivers = receiver_count,
                    "Room event emitted"
                );
                receiver_count
            }
            Err(_) => {
                debug!(room_id = %room_id, "Room event emitted with no receivers");
                0
            }
        }
    }

    /// Subscribe to events for a specific room, creating its channel on first use
    pub async fn subscribe_to_room(&self, room_id: &str) -> broadcast::Receiver<RoomEvent> {
        let mut room_channels = self.room_channels.write().await;

        room_channels
            .entry(room_id.to_string())
            .or_insert_with(|| {
                debug!(room_id = %room_id, "Creating new room channel for subscription");
                broadcast::channel(self.capacity).0
            })
            .subscribe()
    }

    /// Drops the room's sender. Subscribers see the channel close and stop.
    pub async fn close_room(&self, room_id: &str) -> bool {
        let removed = self.room_channels.write().await.remove(room_id).is_some();
        if removed {
            debug!(room_id = %room_id, "Room channel closed");
        }
        removed
    }

    pub async fn has_room(&self, room_id: &str) -> bool {
        self.room_channels.read().await.contains_key(room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websockets::{ChatMessage, MessageKind};
    use tokio::sync::broadcast::error::RecvError;

    fn event(content: &str) -> RoomEvent {
        RoomEvent::MessageSent {
            message: ChatMessage::new("campaign-1", content, MessageKind::Text),
        }
    }

    #[tokio::test]
    async fn test_emit_without_channel_is_dropped() {
        let bus = EventBus::new(8);
        assert_eq!(bus.emit_to_room("campaign-1", event("hello")).await, 0);
        assert!(!bus.has_room("campaign-1").await);
    }

    #[tokio::test]
    async fn test_subscribers_receive_room_events_only() {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe_to_room("campaign-1").await;
        let mut other = bus.subscribe_to_room("campaign-2").await;

        assert_eq!(bus.emit_to_room("campaign-1", event("hello")).await, 1);

        let RoomEvent::MessageSent { message } = first.recv().await.unwrap();
        assert_eq!(message.content, "hello");
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_close_room_ends_subscription() {
        let bus = EventBus::new(8);
        let mut receiver = bus.subscribe_to_room("campaign-1").await;

        assert!(bus.close_room("campaign-1").await);
        assert!(matches!(receiver.recv().await, Err(RecvError::Closed)));
        assert!(!bus.close_room("campaign-1").await);
    }

    #[tokio::test]
    async fn test_slow_receiver_lags() {
        let bus = EventBus::new(2);
        let mut receiver = bus.subscribe_to_room("campaign-1").await;

        for i in 0..4 {
            bus.emit_to_room("campaign-1", event(&i.to_string())).await;
        }

        assert!(matches!(receiver.recv().await, Err(RecvError::Lagged(2))));
    }
}
