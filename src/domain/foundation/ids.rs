//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Declares a UUID-backed identifier with the usual constructors and conversions.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for an order.
    OrderId
);
uuid_id!(
    /// Unique identifier for a line of an order.
    OrderItemId
);
uuid_id!(
    /// Unique identifier for a dining table.
    TableId
);
uuid_id!(
    /// Unique identifier for a menu category.
    CategoryId
);
uuid_id!(
    /// Unique identifier for a menu product.
    ProductId
);
uuid_id!(
    /// Unique identifier for a stocked ingredient.
    IngredientId
);
uuid_id!(StockMovementId);
uuid_id!(StockAlertId);
uuid_id!(
    /// Unique identifier for a daily close record.
    DailyCloseId
);
uuid_id!(
    /// Identifies one live WebSocket connection (not the user behind it).
    ConnectionId
);

/// User identifier, taken verbatim from the token subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Synthetic identity for an unauthenticated socket.
    pub fn guest() -> Self {
        Self(format!("guest-{}", Uuid::new_v4()))
    }

    pub fn is_guest(&self) -> bool {
        self.0.starts_with("guest-")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
