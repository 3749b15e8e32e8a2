use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Let's Roll server is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// GET /
pub async fn service_info() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Campaign manager API for tabletop RPG sessions",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_ok() {
        let Json(body) = health_check().await;
        assert_eq!(body["status"], "OK");
        assert!(body["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_service_info() {
        let Json(body) = service_info().await;
        assert_eq!(body["name"], "letsroll");
    }
}
