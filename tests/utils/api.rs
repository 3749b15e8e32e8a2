#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use letsroll::{build_router, AppConfig, AppState};

/// In-memory server driven through `oneshot`
pub struct TestApp {
    router: Router,
}

/// A registered user and their bearer token
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            router: build_router(AppState::in_memory(&AppConfig::default())),
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn register(&self, username: &str) -> TestUser {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": format!("{username}@example.com"),
                    "username": username,
                    "password": "correct horse",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {username}: {body}");

        TestUser {
            id: body["user"]["id"].as_str().unwrap().to_string(),
            username: username.to_string(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a campaign owned by `master` and returns its id
    pub async fn create_campaign(&self, master: &TestUser, name: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/campaigns",
                Some(&master.token),
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create campaign: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn add_member(
        &self,
        master: &TestUser,
        campaign_id: &str,
        username: &str,
        role: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut body = json!({ "username": username });
        if let Some(role) = role {
            body["role"] = json!(role);
        }
        self.request(
            "POST",
            &format!("/api/campaigns/{campaign_id}/members"),
            Some(&master.token),
            Some(body),
        )
        .await
    }
}
