//! Daily closes and staff accounts over the in-memory store.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::daily_close::DailyClose;
use crate::domain::foundation::{DailyCloseId, DomainError, ErrorCode, UserId};
use crate::domain::staff::StaffAccount;
use crate::ports::{DailyCloseRepository, UserRepository};

use super::MemoryStore;

#[async_trait]
impl DailyCloseRepository for MemoryStore {
    async fn save(&self, close: &DailyClose) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if state
            .closes
            .iter()
            .any(|c| c.is_active() && c.business_date() == close.business_date())
        {
            return Err(DomainError::new(
                ErrorCode::DayAlreadyClosed,
                format!("Business day {} is already closed", close.business_date()),
            )
            .with_detail("business_date", close.business_date().to_string()));
        }
        state.closes.push(close.clone());
        Ok(())
    }

    async fn mark_reopened(&self, close: &DailyClose) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        match state
            .closes
            .iter_mut()
            .find(|c| c.id() == close.id() && c.is_active())
        {
            Some(stored) => {
                *stored = close.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                format!("Daily close {} is no longer active", close.id()),
            )),
        }
    }

    async fn find_by_id(&self, id: &DailyCloseId) -> Result<Option<DailyClose>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.closes.iter().find(|c| c.id() == id).cloned())
    }

    async fn find_active_for(&self, date: NaiveDate) -> Result<Option<DailyClose>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .closes
            .iter()
            .find(|c| c.is_active() && c.business_date() == date)
            .cloned())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<DailyClose>, DomainError> {
        let state = self.state.lock().await;
        let mut closes = state.closes.clone();
        closes.sort_by(|a, b| b.closed_at().cmp(a.closed_at()));
        closes.truncate(limit as usize);
        Ok(closes)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn save(&self, account: &StaffAccount) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|u| u.email == account.email && u.id != account.id)
        {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                format!("Email {} is already registered", account.email),
            )
            .with_detail("email", account.email.clone()));
        }
        state.users.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StaffAccount>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<StaffAccount>, DomainError> {
        Ok(self.state.lock().await.users.get(id).cloned())
    }
}
