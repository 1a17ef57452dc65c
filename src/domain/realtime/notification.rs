//! Typed notifications pushed to real-time clients.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::{Timestamp, ValidationError};

pub const MAX_OPERATOR_TEXT_LENGTH: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewOrder,
    OrderStatusChanged,
    OrderReady,
    TableStatusChanged,
    TableMessage,
    Emergency,
    LowStock,
    OutOfStock,
    DailyClose,
}

/// Client-side buffer a notification lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationCategory {
    Orders,
    Tables,
    System,
}

impl NotificationType {
    /// Event name on the wire.
    pub fn event_name(&self) -> &'static str {
        match self {
            NotificationType::NewOrder => "new-order",
            NotificationType::OrderStatusChanged => "order-status-changed",
            NotificationType::OrderReady => "order-ready",
            NotificationType::TableStatusChanged => "table-status-changed",
            NotificationType::TableMessage => "table-message",
            NotificationType::Emergency => "emergency",
            NotificationType::LowStock => "low-stock",
            NotificationType::OutOfStock => "out-of-stock",
            NotificationType::DailyClose => "daily-close",
        }
    }

    pub fn category(&self) -> NotificationCategory {
        match self {
            NotificationType::NewOrder
            | NotificationType::OrderStatusChanged
            | NotificationType::OrderReady => NotificationCategory::Orders,
            NotificationType::TableStatusChanged | NotificationType::TableMessage => {
                NotificationCategory::Tables
            }
            NotificationType::Emergency
            | NotificationType::LowStock
            | NotificationType::OutOfStock
            | NotificationType::DailyClose => NotificationCategory::System,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub message: String,
    pub data: JsonValue,
    /// ISO-8601.
    pub timestamp: String,
    pub priority: Priority,
}

impl Notification {
    pub fn new(
        kind: NotificationType,
        message: impl Into<String>,
        data: JsonValue,
        priority: Priority,
        at: Timestamp,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            data,
            timestamp: at.to_iso_string(),
            priority,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Free text typed by staff (emergencies, table messages).
pub fn operator_text(raw: &str) -> Result<String, ValidationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ValidationError::empty_field("message"));
    }
    let len = text.chars().count();
    if len > MAX_OPERATOR_TEXT_LENGTH {
        return Err(ValidationError::out_of_range(
            "message",
            1,
            MAX_OPERATOR_TEXT_LENGTH as i64,
            len as i64,
        ));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_type_tag_and_lowercase_priority() {
        let at = Timestamp::from_datetime(
            chrono::DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        );
        let n = Notification::new(
            NotificationType::OrderReady,
            "Order for table 3 is ready",
            json!({"tableNumber": 3}),
            Priority::High,
            at,
        );

        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            json!({
                "type": "order_ready",
                "message": "Order for table 3 is ready",
                "data": {"tableNumber": 3},
                "timestamp": "2024-05-01T12:00:00.000Z",
                "priority": "high"
            })
        );
    }

    #[test]
    fn priorities_are_ordered() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::High < Priority::Critical);
    }

    #[test]
    fn categories_cover_buffers() {
        assert_eq!(NotificationType::NewOrder.category(), NotificationCategory::Orders);
        assert_eq!(NotificationType::TableMessage.category(), NotificationCategory::Tables);
        assert_eq!(NotificationType::LowStock.category(), NotificationCategory::System);
    }

    #[test]
    fn operator_text_is_trimmed_and_bounded() {
        assert_eq!(operator_text("  fire in kitchen ").unwrap(), "fire in kitchen");
        assert!(operator_text("   ").is_err());
        assert!(operator_text(&"x".repeat(501)).is_err());
    }
}
