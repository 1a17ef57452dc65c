//! Application handlers.
//!
//! One handler per use case. Each takes its ports as `Arc<dyn ...>`, checks
//! the caller's role, runs the daily-close gate for mutations, performs a
//! single store write and publishes the resulting events afterwards.

pub mod auth;
pub mod daily_close;
pub(crate) mod events;
pub mod inventory;
pub mod menu;
pub mod order;
pub mod realtime;
pub mod table;

#[cfg(test)]
mod test_support;
