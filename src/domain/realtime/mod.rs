//! Real-time vocabulary: rooms, notifications and routing rules.

mod notification;
mod room;
pub mod routing;

pub use notification::{
    operator_text, Notification, NotificationCategory, NotificationType, Priority,
    MAX_OPERATOR_TEXT_LENGTH,
};
pub use room::{
    rooms_for_role, validate_role_rooms, validate_room_table, Room, RoomTableError, ROLE_ROOMS,
};
pub use routing::Delivery;
