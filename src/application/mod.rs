//! Application layer - use-case handlers and the daily-close gate.

pub mod handlers;
mod lock_guard;

pub use lock_guard::{LockError, LockGuard};
