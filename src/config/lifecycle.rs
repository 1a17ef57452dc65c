//! Order lifecycle configuration

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

use crate::domain::daily_close::{BusinessCalendar, LockPolicy};

use super::error::ValidationError;

const MAX_OFFSET_MINUTES: u32 = 14 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleConfig {
    /// Let mutations through when the daily-close state cannot be read
    #[serde(default = "default_fail_open")]
    pub daily_close_fail_open: bool,

    /// Restaurant's offset from UTC, used to decide the business date
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl LifecycleConfig {
    pub fn lock_policy(&self) -> LockPolicy {
        LockPolicy::new(self.daily_close_fail_open)
    }

    /// Falls back to UTC for an out-of-range offset; `validate` rejects those.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    pub fn calendar(&self) -> BusinessCalendar {
        BusinessCalendar::new(self.utc_offset())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.utc_offset_minutes.unsigned_abs() > MAX_OFFSET_MINUTES {
            return Err(ValidationError::InvalidUtcOffset);
        }
        Ok(())
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            daily_close_fail_open: default_fail_open(),
            utc_offset_minutes: 0,
        }
    }
}

fn default_fail_open() -> bool {
    true
}
