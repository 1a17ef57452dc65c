//! Table module - dining tables, their floor status and QR payloads.

mod aggregate;
mod errors;
mod events;

pub use aggregate::{qr_payload, Table, TableChangeReason, TableStatus};
pub use errors::TableError;
pub use events::TableStatusChanged;
