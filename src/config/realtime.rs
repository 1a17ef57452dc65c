//! Real-time (WebSocket) configuration

use serde::Deserialize;

use crate::domain::foundation::Role;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Token value treated like no token at all. Empty disables it.
    #[serde(default = "default_demo_token")]
    pub demo_token: String,

    /// Role given to sockets that connect without a token
    #[serde(default = "default_guest_role")]
    pub guest_role: Role,

    /// Largest inbound text frame accepted, in bytes
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl RealtimeConfig {
    /// True when `token` should get a guest identity instead of verification.
    pub fn is_guest_token(&self, token: Option<&str>) -> bool {
        match token.map(str::trim) {
            None | Some("") => true,
            Some(token) => !self.demo_token.is_empty() && token == self.demo_token,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if matches!(self.guest_role, Role::Admin | Role::Manager) {
            return Err(ValidationError::GuestRoleTooPrivileged);
        }
        if self.max_frame_bytes < 1024 {
            return Err(ValidationError::InvalidFrameLimit);
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            demo_token: default_demo_token(),
            guest_role: default_guest_role(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

fn default_demo_token() -> String {
    "demo-token".to_string()
}

fn default_guest_role() -> Role {
    Role::Customer
}

fn default_max_frame_bytes() -> usize {
    64 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_blank_and_demo_tokens_are_guests() {
        let config = RealtimeConfig::default();
        assert!(config.is_guest_token(None));
        assert!(config.is_guest_token(Some("  ")));
        assert!(config.is_guest_token(Some("demo-token")));
        assert!(!config.is_guest_token(Some("eyJhbGciOi...")));
    }

    #[test]
    fn empty_demo_token_disables_the_sentinel() {
        let config = RealtimeConfig {
            demo_token: String::new(),
            ..Default::default()
        };
        assert!(!config.is_guest_token(Some("demo-token")));
        assert!(config.is_guest_token(None));
    }

    #[test]
    fn guests_cannot_be_managers() {
        let config = RealtimeConfig {
            guest_role: Role::Manager,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::GuestRoleTooPrivileged)
        ));
        assert!(RealtimeConfig::default().validate().is_ok());
    }
}
