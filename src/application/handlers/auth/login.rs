//! LoginHandler - exchanges email and password for an access token.
//!
//! Unknown email, wrong password and disabled account all answer
//! `InvalidCredentials` so a caller cannot probe which accounts exist.

use std::sync::Arc;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Timestamp};
use crate::domain::staff::normalize_email;
use crate::ports::{PasswordHasher, TokenIssuer, UserRepository};

#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub expires_at: Timestamp,
    pub user: AuthenticatedUser,
}

pub struct LoginHandler {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<dyn TokenIssuer>,
}

impl LoginHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            users,
            hasher,
            issuer,
        }
    }

    pub async fn handle(&self, cmd: LoginCommand) -> Result<LoginResult, AuthError> {
        let email = normalize_email(&cmd.email).map_err(|_| AuthError::InvalidCredentials)?;
        let account = self
            .users
            .find_by_email(&email)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Account lookup failed");
                AuthError::service_unavailable("account lookup failed")
            })?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(&cmd.password, &account.password_hash)? || !account.active {
            tracing::warn!(email = %email, "Rejected login");
            return Err(AuthError::InvalidCredentials);
        }

        let user = account.identity();
        let issued = self.issuer.issue(&user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "Staff logged in");
        Ok(LoginResult {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }
}
