//! Reconnecting notification client.
//!
//! Used by floor terminals and by the integration tests to follow the
//! server's rooms. Lost connections are retried with exponential backoff
//! and recent notifications are kept per category.

mod backoff;
mod buffer;
mod connection;

pub use backoff::{next_delay, ReconnectPolicy};
pub use buffer::{NotificationBuffers, ReceivedNotification, DEFAULT_BUFFER_CAPACITY};
pub use connection::{ClientConfig, ClientError, ConnectionStatus, RealtimeClient};
