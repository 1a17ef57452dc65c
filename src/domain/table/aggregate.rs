//! Dining table aggregate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{TableId, Timestamp, ValidationError};

use super::TableError;

pub const MAX_TABLE_NUMBER: i32 = 999;
pub const MAX_CAPACITY: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    OutOfService,
}

impl TableStatus {
    pub const ALL: [TableStatus; 4] = [
        TableStatus::Available,
        TableStatus::Occupied,
        TableStatus::Reserved,
        TableStatus::OutOfService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "AVAILABLE",
            TableStatus::Occupied => "OCCUPIED",
            TableStatus::Reserved => "RESERVED",
            TableStatus::OutOfService => "OUT_OF_SERVICE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
            TableStatus::OutOfService => "out of service",
        }
    }

    /// Status a table takes when an order is placed on it, if it changes.
    pub fn after_order_placed(&self) -> Option<TableStatus> {
        match self {
            TableStatus::Available | TableStatus::Reserved => Some(TableStatus::Occupied),
            TableStatus::Occupied | TableStatus::OutOfService => None,
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ValidationError::invalid_format("status", format!("unknown table status '{}'", s))
            })
    }
}

/// Why a table changed status; carried on events for the floor staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableChangeReason {
    Manual,
    OrderPlaced,
    OrdersClosed,
}

/// Dining table.
///
/// # Invariants
///
/// - `number` is 1..=999 and unique across tables (enforced by the store)
/// - `capacity` is 1..=50
/// - a table with active orders is never AVAILABLE or OUT_OF_SERVICE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    id: TableId,
    number: i32,
    capacity: i32,
    status: TableStatus,
    qr_payload: String,
    created_at: Timestamp,
}

impl Table {
    pub fn new(number: i32, capacity: i32, public_base_url: &str) -> Result<Self, TableError> {
        if !(1..=MAX_TABLE_NUMBER).contains(&number) {
            return Err(
                ValidationError::out_of_range("number", 1, MAX_TABLE_NUMBER as i64, number as i64)
                    .into(),
            );
        }
        if !(1..=MAX_CAPACITY).contains(&capacity) {
            return Err(ValidationError::out_of_range(
                "capacity",
                1,
                MAX_CAPACITY as i64,
                capacity as i64,
            )
            .into());
        }

        Ok(Self {
            id: TableId::new(),
            number,
            capacity,
            status: TableStatus::Available,
            qr_payload: qr_payload(public_base_url, number),
            created_at: Timestamp::now(),
        })
    }

    pub fn reconstitute(
        id: TableId,
        number: i32,
        capacity: i32,
        status: TableStatus,
        qr_payload: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            number,
            capacity,
            status,
            qr_payload,
            created_at,
        }
    }

    pub fn id(&self) -> &TableId {
        &self.id
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    pub fn status(&self) -> TableStatus {
        self.status
    }

    pub fn qr_payload(&self) -> &str {
        &self.qr_payload
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn ensure_accepts_orders(&self) -> Result<(), TableError> {
        if self.status == TableStatus::OutOfService {
            return Err(TableError::Unavailable {
                number: self.number,
                status: self.status,
            });
        }
        Ok(())
    }

    /// Staff-initiated status change. Returns the previous status.
    pub fn change_status(
        &mut self,
        to: TableStatus,
        active_orders: i64,
    ) -> Result<TableStatus, TableError> {
        let needs_idle = matches!(to, TableStatus::Available | TableStatus::OutOfService);
        if needs_idle && active_orders > 0 {
            return Err(TableError::Busy {
                number: self.number,
                active_orders,
            });
        }
        let previous = self.status;
        self.status = to;
        Ok(previous)
    }

    pub fn ensure_deletable(&self, active_orders: i64) -> Result<(), TableError> {
        if active_orders > 0 {
            return Err(TableError::Busy {
                number: self.number,
                active_orders,
            });
        }
        Ok(())
    }
}

/// Text encoded in the table's QR code: the public menu URL for that table.
pub fn qr_payload(public_base_url: &str, number: i32) -> String {
    format!("{}/menu?table={}", public_base_url.trim_end_matches('/'), number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_table_is_available_with_qr_payload() {
        let table = Table::new(3, 4, "https://resto.example/").unwrap();
        assert_eq!(table.status(), TableStatus::Available);
        assert_eq!(table.qr_payload(), "https://resto.example/menu?table=3");
    }

    #[test]
    fn rejects_out_of_range_numbers_and_capacity() {
        assert!(Table::new(0, 4, "http://x").is_err());
        assert!(Table::new(1000, 4, "http://x").is_err());
        assert!(Table::new(1, 0, "http://x").is_err());
        assert!(Table::new(1, 51, "http://x").is_err());
    }

    #[test]
    fn placing_an_order_occupies_available_and_reserved_tables() {
        assert_eq!(
            TableStatus::Available.after_order_placed(),
            Some(TableStatus::Occupied)
        );
        assert_eq!(
            TableStatus::Reserved.after_order_placed(),
            Some(TableStatus::Occupied)
        );
        assert_eq!(TableStatus::Occupied.after_order_placed(), None);
    }

    #[test]
    fn out_of_service_table_refuses_orders() {
        let mut table = Table::new(8, 2, "http://x").unwrap();
        table.change_status(TableStatus::OutOfService, 0).unwrap();
        assert!(matches!(
            table.ensure_accepts_orders(),
            Err(TableError::Unavailable { number: 8, .. })
        ));
    }

    #[test]
    fn cannot_free_a_table_with_active_orders() {
        let mut table = Table::new(2, 2, "http://x").unwrap();
        table.change_status(TableStatus::Occupied, 1).unwrap();

        let err = table.change_status(TableStatus::Available, 1).unwrap_err();
        assert!(matches!(err, TableError::Busy { active_orders: 1, .. }));
        assert_eq!(table.status(), TableStatus::Occupied);

        assert_eq!(
            table.change_status(TableStatus::Available, 0).unwrap(),
            TableStatus::Occupied
        );
    }

    #[test]
    fn status_parses_from_wire_name() {
        assert_eq!(
            "out_of_service".parse::<TableStatus>().unwrap(),
            TableStatus::OutOfService
        );
    }
}
