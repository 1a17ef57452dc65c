//! Daily close repository port.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::daily_close::DailyClose;
use crate::domain::foundation::{DailyCloseId, DomainError};

#[async_trait]
pub trait DailyCloseRepository: Send + Sync {
    /// # Errors
    ///
    /// - `DayAlreadyClosed` (detail `business_date`) if another active close
    ///   exists for the same date
    async fn save(&self, close: &DailyClose) -> Result<(), DomainError>;

    /// Persists a reopen. Only applies while the stored close is still active.
    ///
    /// # Errors
    ///
    /// - `ConcurrentModification` if it was reopened meanwhile
    async fn mark_reopened(&self, close: &DailyClose) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &DailyCloseId) -> Result<Option<DailyClose>, DomainError>;

    /// The close for `date` that has not been reopened, if any.
    async fn find_active_for(&self, date: NaiveDate) -> Result<Option<DailyClose>, DomainError>;

    /// Most recent first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<DailyClose>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_close_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn DailyCloseRepository) {}
    }
}
