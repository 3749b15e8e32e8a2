//! Test assertion helpers - fluent API for verifying relayed frames
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use letsroll::websockets::{MessageType, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    users: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    pub fn for_all_users(setup: &'a TestSetup) -> Self {
        let users = setup.connections.iter().map(|(_, u)| u.as_str()).collect();
        Self { setup, users }
    }

    pub fn for_users(setup: &'a TestSetup, users: Vec<&'a str>) -> Self {
        Self { setup, users }
    }

    /// Asserts every user's next frame has the given type and the same payload
    pub async fn received_message_type(self, expected_type: MessageType) -> MessageContent {
        let mut messages = vec![];

        for user in &self.users {
            let connection_id = self.setup.connection_of(user);
            let raw = self
                .setup
                .mock_conn_manager
                .consume_message_for(connection_id)
                .await
                .unwrap_or_else(|| panic!("{user} should have received a message"));

            let msg: WebSocketMessage = serde_json::from_str(&raw).unwrap();
            assert_eq!(
                msg.message_type, expected_type,
                "{user} received wrong message type"
            );
            messages.push(msg);
        }

        let first_payload = &messages[0].payload;
        for (i, msg) in messages.iter().enumerate().skip(1) {
            assert_eq!(
                &msg.payload, first_payload,
                "{} payload differs from {}",
                self.users[i], self.users[0]
            );
        }

        MessageContent {
            payload: first_payload.clone(),
        }
    }

    pub async fn received_no_messages(self) {
        for user in &self.users {
            let connection_id = self.setup.connection_of(user);
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(connection_id)
                .await;
            assert!(
                messages.is_empty(),
                "{user} should not have received any messages, got {messages:?}"
            );
        }
    }
}

/// Payload of a received frame with helpers for the relay's message shape
pub struct MessageContent {
    pub payload: Value,
}

impl MessageContent {
    pub fn content(&self) -> &str {
        self.payload["content"].as_str().unwrap_or_default()
    }

    pub fn verify_content(self, expected: &str) -> Self {
        assert_eq!(self.content(), expected);
        self
    }

    pub fn verify_kind(self, expected: &str) -> Self {
        assert_eq!(self.payload["type"], expected);
        self
    }

    pub fn verify_author(self, username: &str) -> Self {
        assert_eq!(self.payload["user"]["username"], username);
        self
    }

    pub fn verify_campaign(self, campaign_id: &str) -> Self {
        assert_eq!(self.payload["campaignId"], campaign_id);
        self
    }

    /// Parses the result out of `Rolled 1d{sides}: **{result}**`
    pub fn roll_result(&self) -> u32 {
        self.content()
            .rsplit("**")
            .nth(1)
            .and_then(|n| n.parse().ok())
            .unwrap_or_else(|| panic!("not a dice roll: {}", self.content()))
    }
}
