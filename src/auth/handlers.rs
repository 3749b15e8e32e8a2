use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, instrument};

use super::types::{AuthClaims, AuthResponse, LoginRequest, ProfileResponse, RegisterRequest};
use crate::shared::{AppError, AppState};

/// HTTP handler for registering a user
///
/// POST /api/auth/register
/// Returns a JWT token and the public user fields
#[instrument(name = "register", skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    info!("Registering new user");

    let response = state.auth_service.register(request).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// HTTP handler for logging in
///
/// POST /api/auth/login
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = state.auth_service.login(request).await?;
    Ok(Json(response))
}

/// HTTP handler returning the authenticated user's profile
///
/// GET /api/auth/me
#[instrument(name = "me", skip(state, claims), fields(user_id = %claims.id))]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.auth_service.profile(&claims.id).await?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::routes::build_router;
    use crate::shared::AppState;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt; // for `oneshot`

    fn app() -> Router {
        build_router(AppState::in_memory(&AppConfig::default()))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_handler_created() {
        let app = app();
        let (status, body) = send(
            &app,
            post_json(
                "/api/auth/register",
                json!({"email": "ana@example.com", "username": "ana", "password": "hunter2"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["token"].as_str().unwrap().contains('.'));
        assert_eq!(body["user"]["username"], "ana");
        assert!(body["user"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_register_handler_missing_fields() {
        let app = app();
        let (status, body) = send(
            &app,
            post_json("/api/auth/register", json!({"email": "ana@example.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_me_handler_requires_token() {
        let app = app();
        let request = Request::builder()
            .method("GET")
            .uri("/api/auth/me")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token not provided");
    }

    #[tokio::test]
    async fn test_me_handler_rejects_malformed_header() {
        let app = app();
        let request = Request::builder()
            .method("GET")
            .uri("/api/auth/me")
            .header("Authorization", "Token abc")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token format");
    }

    #[tokio::test]
    async fn test_me_handler_returns_profile() {
        let app = app();
        let (_, registered) = send(
            &app,
            post_json(
                "/api/auth/register",
                json!({"email": "ana@example.com", "username": "ana", "password": "hunter2"}),
            ),
        )
        .await;
        let token = registered["token"].as_str().unwrap();

        let request = Request::builder()
            .method("GET")
            .uri("/api/auth/me")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "ana@example.com");
        assert_eq!(body["timezone"], "America/Sao_Paulo");
        assert!(body["createdAt"].is_string());
    }
}
