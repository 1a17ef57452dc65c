//! Mock authentication adapters for tests and local demos.
//!
//! # Example
//!
//! ```ignore
//! let verifier = MockTokenVerifier::new()
//!     .with_user("kitchen-token", AuthenticatedUser::new(id, "Chef", Role::Kitchen));
//! let user = verifier.verify("kitchen-token").await?;
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Timestamp};
use crate::ports::{IssuedToken, PasswordHasher, TokenIssuer, TokenVerifier};

/// Maps fixed tokens to users. Unknown tokens are `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockTokenVerifier {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    force_error: RwLock<Option<AuthError>>,
}

impl MockTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Forces every verification to fail with `error`.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.into(), user);
    }

    pub fn remove_token(&self, token: &str) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
    }
}

#[async_trait]
impl TokenVerifier for MockTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Issues `token-{user id}` and registers nothing; pair it with
/// `MockTokenVerifier::add_token` when a round trip is needed.
#[derive(Debug, Default)]
pub struct MockTokenIssuer;

impl TokenIssuer for MockTokenIssuer {
    fn issue(&self, user: &AuthenticatedUser) -> Result<IssuedToken, AuthError> {
        Ok(IssuedToken {
            token: format!("token-{}", user.id),
            expires_at: Timestamp::now().plus_secs(3600),
        })
    }
}

/// Stores passwords as `plain:{password}`. Never use outside tests.
#[derive(Debug, Default)]
pub struct PlainTextHasher;

impl PasswordHasher for PlainTextHasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain:{}", password))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        match hash.strip_prefix("plain:") {
            Some(stored) => Ok(stored == password),
            None => Err(AuthError::service_unavailable("not a plain-text hash")),
        }
    }
}
