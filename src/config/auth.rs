//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Token signing for staff logins (HS256).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used to sign and verify access tokens
    pub jwt_secret: SecretString,

    /// Access token lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// Admin account created at startup when no account has this email
    #[serde(default)]
    pub bootstrap_admin_email: Option<String>,

    #[serde(default)]
    pub bootstrap_admin_password: Option<SecretString>,
}

const MIN_PRODUCTION_SECRET_LEN: usize = 32;
const MAX_TOKEN_TTL_SECS: u64 = 7 * 24 * 3600;

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: SecretString::new(jwt_secret.into()),
            token_ttl_secs: default_token_ttl(),
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// In production the secret must be at least 32 bytes.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if *environment == Environment::Production && secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(ValidationError::WeakJwtSecret);
        }
        if self.bootstrap_admin_email.is_some() != self.bootstrap_admin_password.is_some() {
            return Err(ValidationError::MissingRequired("AUTH__BOOTSTRAP_ADMIN_PASSWORD"));
        }
        if self.token_ttl_secs < 60 || self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ValidationError::InvalidTokenTtl);
        }
        Ok(())
    }
}

fn default_token_ttl() -> u64 {
    12 * 3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_is_twelve_hours() {
        let config = AuthConfig::new("dev-secret");
        assert_eq!(config.token_ttl(), Duration::from_secs(43_200));
    }

    #[test]
    fn empty_secret_is_rejected() {
        let config = AuthConfig::new("");
        assert!(matches!(
            config.validate(&Environment::Development),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn short_secret_only_allowed_outside_production() {
        let config = AuthConfig::new("dev-secret");
        assert!(config.validate(&Environment::Development).is_ok());
        assert!(matches!(
            config.validate(&Environment::Production),
            Err(ValidationError::WeakJwtSecret)
        ));
        let strong = AuthConfig::new("x".repeat(32));
        assert!(strong.validate(&Environment::Production).is_ok());
    }

    #[test]
    fn ttl_bounds_are_checked() {
        let mut config = AuthConfig::new("dev-secret");
        config.token_ttl_secs = 10;
        assert!(config.validate(&Environment::Development).is_err());
        config.token_ttl_secs = MAX_TOKEN_TTL_SECS + 1;
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn bootstrap_admin_needs_both_email_and_password() {
        let mut config = AuthConfig::new("dev-secret");
        config.bootstrap_admin_email = Some("admin@comanda.local".to_string());
        assert!(config.validate(&Environment::Development).is_err());
        config.bootstrap_admin_password = Some(SecretString::new("changeme".to_string()));
        assert!(config.validate(&Environment::Development).is_ok());
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let config = AuthConfig::new("super-secret-value");
        assert!(!format!("{:?}", config).contains("super-secret-value"));
    }
}
