//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `OrderRepository` - orders, with the lifecycle side effects in one write
//! - `TableRepository`, `MenuRepository`, `InventoryRepository`
//! - `DailyCloseRepository`, `UserRepository`
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events
//! - `EventSubscriber` - Port for subscribing to domain events
//! - `EventHandler` - Handler that processes incoming events
//!
//! ## Auth and Real-time Ports
//!
//! - `TokenVerifier`, `TokenIssuer`, `PasswordHasher`
//! - `ConnectionRegistry` - connected clients and their identity
//! - `NotificationBroadcaster` - room delivery

mod auth_provider;
mod connection_registry;
mod daily_close_repository;
mod event_publisher;
mod event_subscriber;
mod inventory_repository;
mod menu_repository;
mod notification_broadcaster;
mod order_repository;
mod pagination;
mod table_repository;
mod user_repository;

pub use auth_provider::{IssuedToken, PasswordHasher, TokenIssuer, TokenVerifier};
pub use connection_registry::{ConnectionInfo, ConnectionRegistry};
pub use daily_close_repository::DailyCloseRepository;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use inventory_repository::{InventoryRepository, MovementOutcome, MovementRequest};
pub use menu_repository::{MenuRepository, ProductFilter};
pub use notification_broadcaster::NotificationBroadcaster;
pub use order_repository::{OrderFilter, OrderRepository, StatusChange, StatusChangeOutcome};
pub use pagination::{Page, PageInfo, PageRequest};
pub use table_repository::TableRepository;
pub use user_repository::UserRepository;
