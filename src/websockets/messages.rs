use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Frame types for WebSocket communication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    // Client -> Server
    JoinRoom,
    SendMessage,
    RollDice,

    // Server -> Client
    ReceiveMessage,
    RoomJoined,
    Error,
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Envelope of every frame exchanged over `/ws`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub meta: Option<WebSocketMessageMeta>,
}

/// Kind of a relayed session message. Kinds the server does not know are
/// kept verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    #[default]
    Text,
    DiceRoll,
    Narration,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MessageAuthor {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Chat line relayed to a campaign room.
///
/// Fields the server does not know about are carried through in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub campaign_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<MessageAuthor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    /// Server-authored message with a fresh id and timestamp
    pub fn new(campaign_id: &str, content: &str, kind: MessageKind) -> Self {
        Self {
            campaign_id: campaign_id.to_string(),
            content: content.to_string(),
            kind,
            user: None,
            timestamp: Some(Value::String(Utc::now().to_rfc3339())),
            id: Some(Uuid::new_v4().to_string()),
            extra: Map::new(),
        }
    }

    pub fn with_author(mut self, username: &str) -> Self {
        self.user = Some(MessageAuthor {
            username: username.to_string(),
            ..Default::default()
        });
        self
    }
}

/// `roll_dice` payload: either a fixed die or a free-form formula
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollDicePayload {
    pub campaign_id: String,
    pub sides: Option<u32>,
    pub formula: Option<String>,
}

/// Reads the campaign id of a `join_room` payload, sent either bare or wrapped
pub fn campaign_id_of(payload: &Value) -> Option<String> {
    let id = match payload {
        Value::String(id) => id.as_str(),
        Value::Object(fields) => fields.get("campaignId")?.as_str()?,
        _ => return None,
    };

    let id = id.trim();
    (!id.is_empty()).then(|| id.to_string())
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    /// Create a receive_message frame
    pub fn receive_message(message: &ChatMessage) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            MessageType::ReceiveMessage,
            serde_json::to_value(message)?,
        ))
    }

    /// Create a room_joined frame
    pub fn room_joined(campaign_id: &str) -> Self {
        Self::new(MessageType::RoomJoined, json!({ "campaignId": campaign_id }))
    }

    /// Create an error frame
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(MessageType::Error, json!({ "message": message.into() }))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
