//! Order module - placement, lifecycle, payment.

mod aggregate;
mod errors;
mod events;
mod status;

pub use aggregate::{
    Order, OrderItem, OrderLine, Payment, PaymentMethod, MAX_ITEMS_PER_ORDER, MAX_ITEM_QUANTITY,
};
pub use errors::OrderError;
pub use events::{OrderCreated, OrderPaid, OrderStatusChanged, OrderedItem};
pub use status::OrderStatus;
