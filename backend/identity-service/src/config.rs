//! Configuration management for the identity service
//!
//! Settings come from environment variables; a `.env` file is loaded in
//! development builds.
//!
//! # Example
//!
//! ```no_run
//! use identity_service::config::Settings;
//!
//! let settings = Settings::load().expect("configuration");
//! println!("listening on port {}", settings.server.port);
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use tracing::info;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub cors: CorsSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct JwtSettings {
    /// Base64-encoded HMAC signing key.
    pub secret_key: String,
    /// Token lifetime in seconds.
    pub ttl_secs: i64,
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret_key", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsSettings {
    /// Browser frontend origin allowed to call the API with credentials.
    pub allowed_origin: String,
}

impl Settings {
    /// Load settings from the environment.
    pub fn load() -> Result<Self> {
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
            info!("Loaded .env file for development");
        }

        Ok(Settings {
            server: ServerSettings {
                host: env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("APP_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("APP_PORT must be a valid port number")?,
            },
            database: DatabaseSettings {
                url: env::var("DATABASE_URL").context("DATABASE_URL is required")?,
                max_connections: env::var("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .context("DB_MAX_CONNECTIONS must be a number")?,
            },
            jwt: JwtSettings {
                secret_key: env::var("JWT_SECRET_KEY").context("JWT_SECRET_KEY is required")?,
                ttl_secs: env::var("JWT_TTL_SECS")
                    .unwrap_or_else(|_| "86400".to_string())
                    .parse()
                    .context("JWT_TTL_SECS must be a number")?,
            },
            cors: CorsSettings {
                allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                    .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_settings_debug_redacts_secret() {
        let jwt = JwtSettings {
            secret_key: "c2VjcmV0LXNpZ25pbmcta2V5".to_string(),
            ttl_secs: 86400,
        };
        let debug = format!("{:?}", jwt);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("c2VjcmV0"));
    }
}
