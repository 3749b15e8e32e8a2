#![allow(dead_code)]

use std::sync::Arc;
use tokio::sync::mpsc;

use letsroll::{
    event::EventBus,
    room::{InMemoryRoomRepository, RoomService},
    websockets::{ConnectionManager, WebSocketRoomSubscriber, WebsocketReceiveHandler},
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// A relay wired exactly like the server, with recorded outbound frames
pub struct TestSetup {
    pub event_bus: EventBus,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub room_service: Arc<RoomService>,
    pub input_handler: WebsocketReceiveHandler,
    /// (connection id, username)
    pub connections: Vec<(String, String)>,
}

pub struct TestSetupBuilder {
    connections: Vec<(String, String)>,
    capacity: usize,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            connections: vec![],
            capacity: 100,
        }
    }

    /// Each user gets one connection whose id is `conn-<username>`
    pub fn with_users(mut self, users: Vec<&str>) -> Self {
        self.connections = users
            .into_iter()
            .map(|u| (format!("conn-{u}"), u.to_string()))
            .collect();
        self
    }

    pub fn with_three_users(self) -> Self {
        self.with_users(vec!["ana", "bruno", "carla"])
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub async fn build(self) -> TestSetup {
        let event_bus = EventBus::new(self.capacity);
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let mock_conn_manager = Arc::new(MockConnectionManager::new());

        for (connection_id, _) in &self.connections {
            let (sender, _receiver) = mpsc::unbounded_channel();
            mock_conn_manager
                .add_connection(connection_id.clone(), sender)
                .await;
        }

        let subscriber = Arc::new(WebSocketRoomSubscriber::new(
            rooms.clone(),
            mock_conn_manager.clone(),
        ));
        let room_service = Arc::new(RoomService::new(rooms, event_bus.clone(), subscriber));

        let input_handler = WebsocketReceiveHandler::new(
            event_bus.clone(),
            room_service.clone(),
            mock_conn_manager.clone(),
        );

        TestSetup {
            event_bus,
            mock_conn_manager,
            room_service,
            input_handler,
            connections: self.connections,
        }
    }
}

impl TestSetup {
    pub fn connection_of(&self, username: &str) -> &str {
        self.connections
            .iter()
            .find(|(_, u)| u == username)
            .map(|(c, _)| c.as_str())
            .unwrap_or_else(|| panic!("no connection for {username}"))
    }
}
