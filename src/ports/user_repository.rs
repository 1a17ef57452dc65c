//! Staff account repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::staff::StaffAccount;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// # Errors
    ///
    /// - `AlreadyExists` (detail `email`) when the email is taken
    async fn save(&self, account: &StaffAccount) -> Result<(), DomainError>;

    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<StaffAccount>, DomainError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<StaffAccount>, DomainError>;
}
