//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `COMANDA` prefix and
//! `__` between nesting levels.
//!
//! # Example
//!
//! ```no_run
//! use comanda::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod lifecycle;
mod realtime;
mod server;

pub use auth::AuthConfig;
pub use database::{DatabaseConfig, StorageBackend};
pub use error::{ConfigError, ValidationError};
pub use lifecycle::LifecycleConfig;
pub use realtime::RealtimeConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

use crate::domain::realtime::validate_role_rooms;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    pub auth: AuthConfig,

    #[serde(default)]
    pub realtime: RealtimeConfig,

    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

impl AppConfig {
    /// Defaults everywhere except the required auth section.
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth,
            realtime: RealtimeConfig::default(),
            lifecycle: LifecycleConfig::default(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present (development)
    /// 2. Reads variables with the `COMANDA` prefix
    /// 3. Splits nested keys on `__`
    ///
    /// - `COMANDA__SERVER__PORT=3001` -> `server.port = 3001`
    /// - `COMANDA__LIFECYCLE__DAILY_CLOSE_FAIL_OPEN=false`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COMANDA")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate every section, plus the role → rooms table.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.realtime.validate()?;
        self.lifecycle.validate()?;
        validate_role_rooms()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
