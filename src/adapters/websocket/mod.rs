//! WebSocket adapters: live notifications for the floor.
//!
//! ```text
//!   LocalEventBus ──▶ NotificationBridge ──▶ RoomBroadcaster
//!                                                 │
//!                                                 ▼
//!   socket ◀── writer task ◀── send queue ◀── RoomManager
//!                                   ▲
//!   socket ──▶ reader task ─────────┘ (join/leave, ping, operator messages)
//! ```
//!
//! - [`registry`] - user → live connection
//! - [`rooms`] - room membership and per-connection send queues
//! - [`broadcaster`] - deliveries → room sends
//! - [`event_bridge`] - domain events → deliveries
//! - [`handler`] - axum upgrade and socket lifecycle
//! - [`messages`] - frame protocol

pub mod broadcaster;
pub mod event_bridge;
pub mod handler;
pub mod messages;
pub mod registry;
pub mod rooms;

pub use broadcaster::RoomBroadcaster;
pub use event_bridge::{NotificationBridge, REALTIME_EVENT_TYPES};
pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use messages::{ClientMessage, ServerMessage};
pub use registry::InMemoryConnectionRegistry;
pub use rooms::{ConnectionSender, RoomManager};
