//! Which rooms hear about what, and how urgently.
//!
//! Every function here is pure: a domain event in, a list of
//! (room, notification) deliveries out. The broadcaster only sends them.

use serde_json::json;

use crate::domain::daily_close::{DayClosed, DayReopened};
use crate::domain::foundation::{Role, TableId, Timestamp};
use crate::domain::inventory::{AlertType, StockAlertRaised};
use crate::domain::order::{OrderCreated, OrderStatus, OrderStatusChanged};
use crate::domain::table::TableStatusChanged;

use super::{Notification, NotificationType, Priority, Room};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub room: Room,
    pub notification: Notification,
}

impl Delivery {
    fn new(room: Room, notification: Notification) -> Self {
        Self { room, notification }
    }
}

/// Kitchen must act on a new order; management only needs to know.
pub fn new_order(event: &OrderCreated) -> Vec<Delivery> {
    let units: i32 = event.items.iter().map(|item| item.quantity).sum();
    let base = Notification::new(
        NotificationType::NewOrder,
        format!("New order for table {} ({} items)", event.table_number, units),
        json!({
            "orderId": event.order_id,
            "tableId": event.table_id,
            "tableNumber": event.table_number,
            "items": event.items,
            "total": event.total,
            "notes": event.notes,
        }),
        Priority::High,
        event.created_at,
    );

    vec![
        Delivery::new(Room::Kitchen, base.clone()),
        Delivery::new(Room::Management, base.with_priority(Priority::Medium)),
    ]
}

pub fn order_status_changed(event: &OrderStatusChanged) -> Vec<Delivery> {
    let data = json!({
        "orderId": event.order_id,
        "tableId": event.table_id,
        "tableNumber": event.table_number,
        "from": event.from,
        "to": event.to,
        "tableReleased": event.table_released,
    });
    let table_room = Room::Table(event.table_id);
    let guest_message = format!("Your order is {}", event.to.label());

    if event.to == OrderStatus::Ready {
        let ready = Notification::new(
            NotificationType::OrderReady,
            format!("Order for table {} is ready", event.table_number),
            data,
            Priority::High,
            event.changed_at,
        );
        return vec![
            Delivery::new(Room::Waiters, ready.clone()),
            Delivery::new(Room::Management, ready.clone().with_priority(Priority::Medium)),
            Delivery::new(
                table_room,
                ready.with_priority(Priority::Low).with_message(guest_message),
            ),
        ];
    }

    let changed = Notification::new(
        NotificationType::OrderStatusChanged,
        format!(
            "Order for table {} is {}",
            event.table_number,
            event.to.label()
        ),
        data,
        Priority::Medium,
        event.changed_at,
    );
    let mut deliveries = vec![
        Delivery::new(Room::Waiters, changed.clone()),
        Delivery::new(Room::Management, changed.clone()),
    ];
    match event.to {
        OrderStatus::Confirmed => {
            deliveries.push(Delivery::new(Room::Kitchen, changed.clone()));
        }
        OrderStatus::Cancelled => {
            deliveries.push(Delivery::new(
                Room::Kitchen,
                changed.clone().with_priority(Priority::High),
            ));
        }
        _ => {}
    }
    deliveries.push(Delivery::new(
        table_room,
        changed.with_priority(Priority::Low).with_message(guest_message),
    ));
    deliveries
}

pub fn table_status_changed(event: &TableStatusChanged) -> Vec<Delivery> {
    let notification = Notification::new(
        NotificationType::TableStatusChanged,
        format!("Table {} is now {}", event.table_number, event.to.label()),
        json!({
            "tableId": event.table_id,
            "tableNumber": event.table_number,
            "from": event.from,
            "to": event.to,
            "reason": event.reason,
        }),
        Priority::Low,
        event.changed_at,
    );
    vec![
        Delivery::new(Room::Waiters, notification.clone()),
        Delivery::new(Room::Management, notification.clone()),
        Delivery::new(Room::Table(event.table_id), notification),
    ]
}

/// Staff message to everyone following one table.
pub fn table_message(table_id: TableId, text: &str, sender: &str) -> Vec<Delivery> {
    vec![Delivery::new(
        Room::Table(table_id),
        Notification::new(
            NotificationType::TableMessage,
            text,
            json!({ "tableId": table_id, "from": sender }),
            Priority::Medium,
            Timestamp::now(),
        ),
    )]
}

pub fn emergency(text: &str, sender: &str, role: Role) -> Vec<Delivery> {
    vec![Delivery::new(
        Room::Global,
        Notification::new(
            NotificationType::Emergency,
            text,
            json!({ "from": sender, "role": role }),
            Priority::Critical,
            Timestamp::now(),
        ),
    )]
}

pub fn stock_alert(event: &StockAlertRaised) -> Vec<Delivery> {
    let (kind, priority, message) = match event.alert_type {
        AlertType::LowStock => (
            NotificationType::LowStock,
            Priority::High,
            format!(
                "{} is running low: {} left (minimum {})",
                event.ingredient_name,
                event.current_stock.normalize(),
                event.min_stock.normalize()
            ),
        ),
        AlertType::OutOfStock => (
            NotificationType::OutOfStock,
            Priority::Critical,
            format!("{} is out of stock", event.ingredient_name),
        ),
    };
    let notification = Notification::new(
        kind,
        message,
        json!({
            "alertId": event.alert_id,
            "ingredientId": event.ingredient_id,
            "ingredientName": event.ingredient_name,
            "currentStock": event.current_stock,
            "minStock": event.min_stock,
        }),
        priority,
        event.raised_at,
    );
    vec![
        Delivery::new(Room::Management, notification.clone()),
        Delivery::new(Room::Kitchen, notification),
    ]
}

pub fn day_closed(event: &DayClosed) -> Vec<Delivery> {
    vec![Delivery::new(
        Room::Management,
        Notification::new(
            NotificationType::DailyClose,
            format!("Business day {} closed", event.business_date),
            json!({
                "closeId": event.close_id,
                "businessDate": event.business_date,
                "closed": true,
                "totals": event.totals,
            }),
            Priority::Medium,
            event.closed_at,
        ),
    )]
}

pub fn day_reopened(event: &DayReopened) -> Vec<Delivery> {
    vec![Delivery::new(
        Room::Management,
        Notification::new(
            NotificationType::DailyClose,
            format!("Business day {} reopened", event.business_date),
            json!({
                "closeId": event.close_id,
                "businessDate": event.business_date,
                "closed": false,
            }),
            Priority::Medium,
            event.reopened_at,
        ),
    )]
}
