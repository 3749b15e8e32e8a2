use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    http::HeaderMap,
    response::Response,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    connection_manager::ConnectionManager,
    messages::{
        campaign_id_of, ChatMessage, MessageKind, MessageType, RollDicePayload, WebSocketMessage,
    },
    socket::{Connection, MessageHandler},
};
use crate::dice::{self, DiceError};
use crate::event::{EventBus, RoomEvent};
use crate::room::RoomService;
use crate::shared::{AppError, AppState};

/// Handles frames sent by a client over its WebSocket
pub struct WebsocketReceiveHandler {
    event_bus: EventBus,
    room_service: Arc<RoomService>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl WebsocketReceiveHandler {
    pub fn new(
        event_bus: EventBus,
        room_service: Arc<RoomService>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            event_bus,
            room_service,
            connection_manager,
        }
    }

    async fn reply(&self, connection_id: &str, frame: WebSocketMessage) {
        match frame.to_json() {
            Ok(json) => {
                self.connection_manager
                    .send_to_connection(connection_id, &json)
                    .await
            }
            Err(e) => warn!(error = %e, "Failed to serialize reply"),
        }
    }

    async fn reply_error(&self, connection_id: &str, message: &str) {
        self.reply(connection_id, WebSocketMessage::error(message))
            .await;
    }

    async fn join_room(&self, connection_id: &str, payload: &Value) {
        let Some(campaign_id) = campaign_id_of(payload) else {
            self.reply_error(connection_id, "join_room requires a campaign id")
                .await;
            return;
        };

        match self.room_service.join_room(&campaign_id, connection_id).await {
            Ok(_) => {
                self.reply(connection_id, WebSocketMessage::room_joined(&campaign_id))
                    .await
            }
            Err(e) => {
                warn!(campaign_id = %campaign_id, error = %e, "Failed to join room");
                self.reply_error(connection_id, "Could not join room").await;
            }
        }
    }

    async fn send_message(&self, connection_id: &str, username: &str, payload: Value) {
        let mut message = match serde_json::from_value::<ChatMessage>(payload) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "Invalid send_message payload");
                self.reply_error(connection_id, "send_message requires a campaignId")
                    .await;
                return;
            }
        };

        if message.user.is_none() {
            message = message.with_author(username);
        }

        self.relay(message).await;
    }

    async fn roll_dice(&self, connection_id: &str, username: &str, payload: Value) {
        let request = match serde_json::from_value::<RollDicePayload>(payload) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "Invalid roll_dice payload");
                self.reply_error(connection_id, "roll_dice requires a campaignId")
                    .await;
                return;
            }
        };

        let content = match compose_roll(&request) {
            Ok(content) => content,
            Err(e) => {
                self.reply_error(connection_id, &e.to_string()).await;
                return;
            }
        };

        let message = ChatMessage::new(&request.campaign_id, &content, MessageKind::DiceRoll)
            .with_author(username);
        self.relay(message).await;
    }

    async fn relay(&self, message: ChatMessage) {
        let campaign_id = message.campaign_id.clone();
        let receivers = self
            .event_bus
            .emit_to_room(&campaign_id, RoomEvent::MessageSent { message })
            .await;

        if receivers == 0 {
            debug!(campaign_id = %campaign_id, "No one in room, message dropped");
        }
    }
}

/// Builds the content of a dice roll message. A fixed die wins over a formula.
fn compose_roll(request: &RollDicePayload) -> Result<String, DiceError> {
    if let Some(sides) = request.sides {
        let result = dice::roll_die(sides)?;
        return Ok(dice::roll_content(sides, result));
    }

    match request.formula.as_deref().map(str::trim) {
        Some(formula) if !formula.is_empty() => Ok(dice::formula_content(formula)),
        _ => Err(DiceError::MissingRoll),
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, connection_id: &str, username: &str, message: String) {
        debug!(
            connection_id = %connection_id,
            username = %username,
            message = %message,
            "Received message"
        );

        let frame = match serde_json::from_str::<WebSocketMessage>(&message) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
                self.reply_error(connection_id, "Invalid message format")
                    .await;
                return;
            }
        };

        match frame.message_type {
            MessageType::JoinRoom => self.join_room(connection_id, &frame.payload).await,
            MessageType::SendMessage => {
                self.send_message(connection_id, username, frame.payload)
                    .await
            }
            MessageType::RollDice => self.roll_dice(connection_id, username, frame.payload).await,
            other => {
                debug!(message_type = ?other, "Ignoring server-only message type");
                self.reply_error(connection_id, "Unsupported message type")
                    .await;
            }
        }
    }
}

/// Reads the JWT offered in Sec-WebSocket-Protocol. Browsers send the list
/// comma separated; the token is the first entry.
fn protocol_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("sec-websocket-protocol")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// WebSocket endpoint authenticated via the Sec-WebSocket-Protocol header
///
/// GET /ws with the JWT as the offered subprotocol; the token is echoed back
/// as the accepted protocol.
#[instrument(name = "websocket", skip_all)]
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    let token = protocol_token(&headers).ok_or_else(|| {
        warn!("Missing or invalid Sec-WebSocket-Protocol header");
        AppError::Unauthorized("Token not provided".to_string())
    })?;

    let claims = app_state.auth_service.validate_token(&token)?;
    let username = claims.username;

    info!(username = %username, "WebSocket authentication successful");

    Ok(ws
        .protocols([token])
        .on_upgrade(move |socket| handle_websocket_connection(socket, username, app_state)))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(
    socket: axum::extract::ws::WebSocket,
    username: String,
    app_state: AppState,
) {
    let connection_id = Uuid::new_v4().to_string();

    info!(
        connection_id = %connection_id,
        username = %username,
        "WebSocket connection established"
    );

    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    app_state
        .connection_manager
        .add_connection(connection_id.clone(), outbound_sender)
        .await;

    let message_handler = Arc::new(WebsocketReceiveHandler::new(
        app_state.event_bus.clone(),
        Arc::clone(&app_state.room_service),
        Arc::clone(&app_state.connection_manager),
    ));

    let connection = Connection::new(
        connection_id.clone(),
        username.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    match connection.run().await {
        Ok(()) => {
            info!(
                connection_id = %connection_id,
                username = %username,
                "WebSocket connection closed cleanly"
            );
        }
        Err(e) => {
            warn!(
                connection_id = %connection_id,
                username = %username,
                error = ?e,
                "WebSocket connection error"
            );
        }
    }

    app_state
        .connection_manager
        .remove_connection(&connection_id)
        .await;

    match app_state.room_service.leave_all(&connection_id).await {
        Ok(closed) => debug!(
            connection_id = %connection_id,
            closed_rooms = closed.len(),
            "Connection removed from rooms"
        ),
        Err(e) => warn!(connection_id = %connection_id, error = %e, "Failed to leave rooms"),
    }
}
