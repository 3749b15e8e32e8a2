use crate::websockets::ChatMessage;

/// Events flowing through a campaign room's broadcast channel
#[derive(Debug, Clone)]
pub enum RoomEvent {
    /// A chat line or dice roll to relay to every connection in the room
    MessageSent { message: ChatMessage },
}
