//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, roles, errors and the event vocabulary shared by
//! every restaurant domain module.

mod auth;
mod decimal;
mod errors;
mod events;
mod ids;
mod role;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use decimal::{DecimalBounds, MONEY, STOCK};
pub use errors::{DomainError, ErrorCategory, ErrorCode, ValidationError};
pub(crate) use events::domain_event;
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata};
pub use ids::{
    CategoryId, ConnectionId, DailyCloseId, IngredientId, OrderId, OrderItemId, ProductId,
    StockAlertId, StockMovementId, TableId, UserId,
};
pub use role::Role;
pub use state_machine::{InvalidTransition, StateMachine};
pub use timestamp::Timestamp;
