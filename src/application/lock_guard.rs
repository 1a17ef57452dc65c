//! Daily-close gate run before every mutating operation.
//!
//! Reopen, login, reads and reports never pass through here.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::daily_close::{BusinessCalendar, GateDecision, LockCategory, LockPolicy};
use crate::domain::foundation::{AuthenticatedUser, DomainError, ErrorCode};
use crate::domain::inventory::InventoryError;
use crate::domain::menu::MenuError;
use crate::domain::order::OrderError;
use crate::domain::table::TableError;
use crate::ports::DailyCloseRepository;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("Daily close is active; {0} is locked")]
    Locked(LockCategory),

    #[error("Daily close state unavailable: {0}")]
    Unavailable(String),
}

pub struct LockGuard {
    closes: Arc<dyn DailyCloseRepository>,
    policy: LockPolicy,
    calendar: BusinessCalendar,
}

impl LockGuard {
    pub fn new(
        closes: Arc<dyn DailyCloseRepository>,
        policy: LockPolicy,
        calendar: BusinessCalendar,
    ) -> Self {
        Self {
            closes,
            policy,
            calendar,
        }
    }

    pub fn calendar(&self) -> &BusinessCalendar {
        &self.calendar
    }

    /// Whether an unreopened close exists for today.
    pub async fn is_today_closed(&self) -> Result<bool, DomainError> {
        let today = self.calendar.today();
        Ok(self.closes.find_active_for(today).await?.is_some())
    }

    pub async fn check(
        &self,
        category: LockCategory,
        actor: &AuthenticatedUser,
    ) -> Result<GateDecision, LockError> {
        let lookup = self.is_today_closed().await;
        let cause = lookup.as_ref().err().map(ToString::to_string);
        let decision = self.policy.decide(lookup.ok(), category, actor.role);

        match decision {
            GateDecision::Open => Ok(decision),
            GateDecision::Bypassed => {
                tracing::info!(
                    user_id = %actor.id,
                    category = %category,
                    "Daily close bypassed by admin"
                );
                Ok(decision)
            }
            GateDecision::FailedOpen => {
                tracing::warn!(
                    category = %category,
                    error = cause.as_deref().unwrap_or_default(),
                    "Daily close lookup failed; proceeding"
                );
                Ok(decision)
            }
            GateDecision::FailedClosed => {
                let cause = cause.unwrap_or_default();
                tracing::error!(category = %category, error = %cause, "Daily close lookup failed");
                Err(LockError::Unavailable(cause))
            }
            GateDecision::Locked(category) => Err(LockError::Locked(category)),
        }
    }
}

impl From<LockError> for OrderError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Locked(category) => OrderError::Locked(category),
            LockError::Unavailable(cause) => OrderError::Infrastructure(cause),
        }
    }
}

impl From<LockError> for TableError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Locked(category) => TableError::Locked(category),
            LockError::Unavailable(cause) => TableError::Infrastructure(cause),
        }
    }
}

impl From<LockError> for MenuError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Locked(category) => MenuError::Locked(category),
            LockError::Unavailable(cause) => MenuError::Infrastructure(cause),
        }
    }
}

impl From<LockError> for InventoryError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Locked(category) => InventoryError::Locked(category),
            LockError::Unavailable(cause) => InventoryError::Infrastructure(cause),
        }
    }
}

impl From<LockError> for DomainError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Locked(category) => {
                DomainError::new(ErrorCode::DailyCloseLocked, err.to_string())
                    .with_detail("category", category.to_string())
            }
            LockError::Unavailable(_) => {
                DomainError::new(ErrorCode::InternalError, err.to_string())
            }
        }
    }
}
