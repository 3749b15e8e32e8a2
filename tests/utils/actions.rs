#![allow(dead_code)]

use serde_json::{json, Value};
use tokio::time::{sleep, Duration};

use letsroll::websockets::{MessageHandler, MessageType, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a raw frame as `username` and wait for the relay to process it
    pub async fn send_raw(&self, username: &str, frame: String) {
        let connection_id = self.connection_of(username).to_string();
        self.input_handler
            .handle_message(&connection_id, username, frame)
            .await;
        sleep(Duration::from_millis(20)).await;
    }

    pub async fn send_frame(&self, username: &str, message_type: MessageType, payload: Value) {
        let frame = serde_json::to_string(&WebSocketMessage::new(message_type, payload)).unwrap();
        self.send_raw(username, frame).await;
    }

    pub async fn join(&self, username: &str, campaign_id: &str) {
        self.send_frame(username, MessageType::JoinRoom, json!(campaign_id))
            .await;
    }

    pub async fn send_chat(&self, username: &str, campaign_id: &str, content: &str) {
        self.send_frame(
            username,
            MessageType::SendMessage,
            json!({
                "campaignId": campaign_id,
                "content": content,
                "type": "TEXT",
            }),
        )
        .await;
    }

    pub async fn roll(&self, username: &str, campaign_id: &str, sides: u32) {
        self.send_frame(
            username,
            MessageType::RollDice,
            json!({ "campaignId": campaign_id, "sides": sides }),
        )
        .await;
    }

    pub async fn roll_formula(&self, username: &str, campaign_id: &str, formula: &str) {
        self.send_frame(
            username,
            MessageType::RollDice,
            json!({ "campaignId": campaign_id, "formula": formula }),
        )
        .await;
    }

    /// Runs the same cleanup the socket task does after a disconnect
    pub async fn disconnect(&self, username: &str) {
        use letsroll::websockets::ConnectionManager;

        let connection_id = self.connection_of(username).to_string();
        self.mock_conn_manager
            .remove_connection(&connection_id)
            .await;
        self.room_service.leave_all(&connection_id).await.unwrap();
        sleep(Duration::from_millis(20)).await;
    }

    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }
}
