//! Authentication ports.
//!
//! - **TokenVerifier**: turns a bearer token into an `AuthenticatedUser`.
//!   HTTP middleware and the WebSocket upgrade both use it.
//! - **TokenIssuer**: mints a token for a user who just logged in.
//! - **PasswordHasher**: hashes and verifies staff passwords.
//!
//! # Example
//!
//! ```ignore
//! let user = verifier.verify(token).await?;
//! user.require_any(&[Role::Admin, Role::Manager])?;
//! ```

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Timestamp};

/// Validates access tokens and extracts user identity.
///
/// # Contract
///
/// Implementations must reject tokens that are malformed, carry a bad
/// signature, or are past their expiry.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// A freshly minted access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &AuthenticatedUser) -> Result<IssuedToken, AuthError>;
}

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// `Ok(false)` for a wrong password; `Err` only when `hash` is unreadable.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}
