//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - JWT tokens and Argon2 password hashing
//! - `events` - in-process event bus
//! - `http` - axum REST API
//! - `memory` - in-memory stores for tests and demos
//! - `postgres` - sqlx stores
//! - `websocket` - rooms, connection registry and live notifications

pub mod auth;
pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod websocket;

pub use events::LocalEventBus;
pub use memory::MemoryStore;
