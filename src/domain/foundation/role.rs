//! Staff and guest roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Role carried in the token and used for both HTTP authorization and room membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Waiter,
    Kitchen,
    Cashier,
    Customer,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Manager,
        Role::Waiter,
        Role::Kitchen,
        Role::Cashier,
        Role::Customer,
    ];

    /// Everyone who works the floor.
    pub const STAFF: [Role; 5] = [
        Role::Admin,
        Role::Manager,
        Role::Waiter,
        Role::Kitchen,
        Role::Cashier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Waiter => "WAITER",
            Role::Kitchen => "KITCHEN",
            Role::Cashier => "CASHIER",
            Role::Customer => "CUSTOMER",
        }
    }

    /// Everyone except customers works the floor.
    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Customer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::invalid_format("role", format!("unknown role '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("kitchen".parse::<Role>().unwrap(), Role::Kitchen);
        assert_eq!(" ADMIN ".parse::<Role>().unwrap(), Role::Admin);
        assert!("chef".parse::<Role>().is_err());
    }

    #[test]
    fn serializes_in_screaming_case() {
        assert_eq!(serde_json::to_string(&Role::Waiter).unwrap(), "\"WAITER\"");
    }

    #[test]
    fn only_customers_are_not_staff() {
        let staff: Vec<_> = Role::ALL.into_iter().filter(Role::is_staff).collect();
        assert_eq!(staff.len(), 5);
        assert!(!Role::Customer.is_staff());
    }
}
