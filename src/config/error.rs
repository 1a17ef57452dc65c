//! Configuration error types

use thiserror::Error;

use crate::domain::realtime::RoomTableError;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Host and port do not form a socket address")]
    InvalidBindAddress,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Public base URL must start with http:// or https://")]
    InvalidPublicBaseUrl,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("JWT secret must be at least 32 bytes in production")]
    WeakJwtSecret,

    #[error("Token lifetime must be between one minute and seven days")]
    InvalidTokenTtl,

    #[error("Guest role may not be ADMIN or MANAGER")]
    GuestRoleTooPrivileged,

    #[error("Inbound frame limit must be at least 1024 bytes")]
    InvalidFrameLimit,

    #[error("UTC offset must be within +/-14 hours")]
    InvalidUtcOffset,

    #[error("Role room table is invalid: {0}")]
    RoomTable(#[from] RoomTableError),
}
