//! Authentication types for the domain layer.
//!
//! `AuthenticatedUser` is what a verified token (or the guest fallback on the
//! socket) turns into. It has no provider dependencies; the `TokenVerifier`
//! port populates it.

use super::{Role, UserId};
use thiserror::Error;

/// Identity attached to an HTTP request or a WebSocket connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }

    /// Synthetic identity for sockets that connect without a real token.
    pub fn guest(role: Role) -> Self {
        Self {
            id: UserId::guest(),
            name: "Guest".to_string(),
            role,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.id.is_guest()
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Fails with `InsufficientPermissions` unless the user holds one of `roles`.
    pub fn require_any(&self, roles: &[Role]) -> Result<(), AuthError> {
        if self.has_any_role(roles) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions)
        }
    }
}

/// Authentication errors that can occur during token validation or login.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::InvalidCredentials
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waiter() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new("u-1").unwrap(), "Ana", Role::Waiter)
    }

    #[test]
    fn require_any_accepts_listed_role() {
        assert!(waiter().require_any(&[Role::Admin, Role::Waiter]).is_ok());
    }

    #[test]
    fn require_any_rejects_other_roles() {
        assert_eq!(
            waiter().require_any(&[Role::Admin, Role::Manager]),
            Err(AuthError::InsufficientPermissions)
        );
    }

    #[test]
    fn guest_gets_synthetic_id_and_given_role() {
        let guest = AuthenticatedUser::guest(Role::Customer);
        assert!(guest.is_guest());
        assert_eq!(guest.role, Role::Customer);
        assert_eq!(guest.name, "Guest");
    }

    #[test]
    fn token_errors_require_reauthentication() {
        assert!(AuthError::InvalidToken.requires_reauthentication());
        assert!(AuthError::TokenExpired.requires_reauthentication());
        assert!(!AuthError::InsufficientPermissions.requires_reauthentication());
        assert!(!AuthError::service_unavailable("down").requires_reauthentication());
    }
}
