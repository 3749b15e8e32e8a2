use std::sync::Arc;

use letsroll::campaign::repository::PostgresCampaignRepository;
use letsroll::character::repository::PostgresCharacterRepository;
use letsroll::user::PostgresUserRepository;
use letsroll::{build_app, AppConfig, AppState};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "letsroll=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Let's Roll server");

    let config = AppConfig::from_env()?;

    let app_state = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await?;
            info!("Database connection pool created");

            sqlx::migrate!().run(&pool).await?;
            info!("Database migrations applied");

            AppState::new(
                &config,
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresCampaignRepository::new(pool.clone())),
                Arc::new(PostgresCharacterRepository::new(pool)),
            )
        }
        None => {
            info!("DATABASE_URL not set, using in-memory repositories");
            AppState::in_memory(&config)
        }
    };

    let app = build_app(app_state, &config)?;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
