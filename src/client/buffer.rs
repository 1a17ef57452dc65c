//! Bounded per-category notification history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::domain::realtime::{Notification, NotificationCategory, Room};

pub const DEFAULT_BUFFER_CAPACITY: usize = 50;

/// A notification as the client received it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedNotification {
    pub event: String,
    pub room: Room,
    pub notification: Notification,
}

impl ReceivedNotification {
    pub fn category(&self) -> NotificationCategory {
        self.notification.kind.category()
    }
}

/// Three FIFO rings. A full ring drops its oldest entry, whatever its priority.
#[derive(Debug, Clone)]
pub struct NotificationBuffers {
    capacity: usize,
    orders: VecDeque<ReceivedNotification>,
    tables: VecDeque<ReceivedNotification>,
    system: VecDeque<ReceivedNotification>,
}

impl NotificationBuffers {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            orders: VecDeque::with_capacity(capacity),
            tables: VecDeque::with_capacity(capacity),
            system: VecDeque::with_capacity(capacity),
        }
    }

    /// Stores `received`, returning the entry it evicted.
    pub fn push(&mut self, received: ReceivedNotification) -> Option<ReceivedNotification> {
        let capacity = self.capacity;
        let ring = match received.category() {
            NotificationCategory::Orders => &mut self.orders,
            NotificationCategory::Tables => &mut self.tables,
            NotificationCategory::System => &mut self.system,
        };
        let evicted = if ring.len() >= capacity {
            ring.pop_front()
        } else {
            None
        };
        ring.push_back(received);
        evicted
    }

    pub fn orders(&self) -> Vec<ReceivedNotification> {
        self.orders.iter().cloned().collect()
    }

    pub fn tables(&self) -> Vec<ReceivedNotification> {
        self.tables.iter().cloned().collect()
    }

    pub fn system(&self) -> Vec<ReceivedNotification> {
        self.system.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.orders.len() + self.tables.len() + self.system.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.orders.clear();
        self.tables.clear();
        self.system.clear();
    }
}

impl Default for NotificationBuffers {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}
