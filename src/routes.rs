use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{AppConfig, ConfigError};
use crate::shared::AppState;
use crate::{auth, campaign, character, health, websockets};

/// Builds every route on top of the shared state.
///
/// Everything under /api except register and login sits behind the JWT guard.
/// The WebSocket authenticates itself through its subprotocol header.
pub fn build_router(state: AppState) -> Router {
    let campaign_routes = Router::new()
        .route(
            "/",
            get(campaign::list_campaigns).post(campaign::create_campaign),
        )
        .route(
            "/:id",
            get(campaign::get_campaign)
                .put(campaign::update_campaign)
                .delete(campaign::archive_campaign),
        )
        .route("/:id/members", post(campaign::add_member));

    let character_routes = Router::new()
        .route("/", post(character::create_character))
        .route(
            "/:id",
            get(character::get_character)
                .put(character::update_character)
                .delete(character::delete_character),
        )
        .route(
            "/campaign/:campaign_id",
            get(character::list_campaign_characters),
        );

    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .nest("/api/campaigns", campaign_routes)
        .nest("/api/characters", character_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::jwt_auth,
        ));

    Router::new()
        .route("/", get(health::service_info))
        .route("/health", get(health::health_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/ws", get(websockets::websocket_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the single configured frontend origin
pub fn cors_layer(config: &AppConfig) -> Result<CorsLayer, ConfigError> {
    let origin = HeaderValue::from_str(&config.cors_origin).map_err(|_| {
        ConfigError::InvalidValue {
            name: "CORS_ORIGIN",
            value: config.cors_origin.clone(),
        }
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true))
}

/// Router with the CORS layer applied, as served by the binary
pub fn build_app(state: AppState, config: &AppConfig) -> Result<Router, ConfigError> {
    Ok(build_router(state).layer(cors_layer(config)?))
}
