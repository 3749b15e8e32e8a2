// Per-room broadcast channels feeding the realtime relay

pub use bus::EventBus;
pub use events::RoomEvent;
pub use room_handler::{RoomEventError, RoomEventHandler};
pub use room_subscription::RoomSubscription;

mod bus;
mod events;
mod room_handler;
mod room_subscription;
