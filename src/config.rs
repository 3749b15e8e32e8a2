use std::net::{IpAddr, SocketAddr};
use thiserror::Error;
use tracing::warn;

const DEV_JWT_SECRET: &str = "letsroll-dev-secret-change-in-production";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Runtime configuration read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_days: i64,
    pub cors_origin: String,
    pub database_url: Option<String>,
    pub room_channel_capacity: usize,
}

impl AppConfig {
    /// Reads configuration from process environment (call `dotenvy::dotenv()` first)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = parse_or("HOST", &lookup, IpAddr::from([0, 0, 0, 0]))?;
        let port = parse_or("PORT", &lookup, 3000u16)?;
        let jwt_expiration_days = parse_or("JWT_EXPIRATION_DAYS", &lookup, 7i64)?;
        let room_channel_capacity = parse_or("ROOM_CHANNEL_CAPACITY", &lookup, 100usize)?;

        if room_channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: "ROOM_CHANNEL_CAPACITY",
                value: "0".to_string(),
            });
        }

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET is not set, falling back to the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());
        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());

        Ok(Self {
            host,
            port,
            jwt_secret,
            jwt_expiration_days,
            cors_origin,
            database_url,
            room_channel_capacity,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiration_days: 7,
            cors_origin: "http://localhost:5173".to_string(),
            database_url: None,
            room_channel_capacity: 100,
        }
    }
}

fn parse_or<T, F>(name: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        None => Ok(default),
    }
}
