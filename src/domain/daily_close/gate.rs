//! Lock decision applied before mutating operations while a day is closed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::Role;

/// Kind of mutation being attempted, named in lock errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockCategory {
    OrderCreation,
    OrderUpdate,
    Payment,
    InventoryChange,
    TableChange,
    MenuChange,
}

impl LockCategory {
    /// Admins may still correct stock after the day is closed.
    pub fn admin_may_bypass(&self) -> bool {
        matches!(self, LockCategory::InventoryChange)
    }
}

impl fmt::Display for LockCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LockCategory::OrderCreation => "order creation",
            LockCategory::OrderUpdate => "order update",
            LockCategory::Payment => "payment",
            LockCategory::InventoryChange => "inventory change",
            LockCategory::TableChange => "table change",
            LockCategory::MenuChange => "menu change",
        };
        f.write_str(s)
    }
}

/// Outcome of asking whether a mutation may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// No active close for today.
    Open,
    /// Day is closed but the caller's role may proceed for this category.
    Bypassed,
    Locked(LockCategory),
    /// Lock state unknown; proceeding because the gate fails open.
    FailedOpen,
    /// Lock state unknown; refusing because the gate fails closed.
    FailedClosed,
}

impl GateDecision {
    pub fn allows(&self) -> bool {
        matches!(
            self,
            GateDecision::Open | GateDecision::Bypassed | GateDecision::FailedOpen
        )
    }
}

/// Daily-close lock policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    /// When the lock state cannot be read, let the operation through.
    pub fail_open: bool,
}

impl LockPolicy {
    pub fn new(fail_open: bool) -> Self {
        Self { fail_open }
    }

    /// `day_closed` is `None` when the lookup failed.
    pub fn decide(
        &self,
        day_closed: Option<bool>,
        category: LockCategory,
        role: Role,
    ) -> GateDecision {
        match day_closed {
            None if self.fail_open => GateDecision::FailedOpen,
            None => GateDecision::FailedClosed,
            Some(false) => GateDecision::Open,
            Some(true) if role == Role::Admin && category.admin_may_bypass() => {
                GateDecision::Bypassed
            }
            Some(true) => GateDecision::Locked(category),
        }
    }
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self { fail_open: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [LockCategory; 6] = [
        LockCategory::OrderCreation,
        LockCategory::OrderUpdate,
        LockCategory::Payment,
        LockCategory::InventoryChange,
        LockCategory::TableChange,
        LockCategory::MenuChange,
    ];

    #[test]
    fn open_day_allows_everything() {
        let policy = LockPolicy::default();
        for category in ALL {
            assert_eq!(policy.decide(Some(false), category, Role::Waiter), GateDecision::Open);
        }
    }

    #[test]
    fn closed_day_locks_every_category_for_non_admins() {
        let policy = LockPolicy::default();
        for category in ALL {
            assert_eq!(
                policy.decide(Some(true), category, Role::Manager),
                GateDecision::Locked(category)
            );
        }
    }

    #[test]
    fn admin_bypasses_inventory_only() {
        let policy = LockPolicy::default();
        assert_eq!(
            policy.decide(Some(true), LockCategory::InventoryChange, Role::Admin),
            GateDecision::Bypassed
        );
        assert_eq!(
            policy.decide(Some(true), LockCategory::OrderCreation, Role::Admin),
            GateDecision::Locked(LockCategory::OrderCreation)
        );
        assert_eq!(
            policy.decide(Some(true), LockCategory::Payment, Role::Admin),
            GateDecision::Locked(LockCategory::Payment)
        );
    }

    #[test]
    fn lookup_failure_follows_configured_mode() {
        let open = LockPolicy::new(true).decide(None, LockCategory::Payment, Role::Cashier);
        let closed = LockPolicy::new(false).decide(None, LockCategory::Payment, Role::Cashier);
        assert_eq!(open, GateDecision::FailedOpen);
        assert!(open.allows());
        assert_eq!(closed, GateDecision::FailedClosed);
        assert!(!closed.allows());
    }

    #[test]
    fn category_names_read_naturally() {
        assert_eq!(LockCategory::InventoryChange.to_string(), "inventory change");
    }
}
