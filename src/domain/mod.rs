//! Domain layer - restaurant business logic.
//!
//! Pure business logic with no infrastructure dependencies.

pub mod daily_close;
pub mod foundation;
pub mod inventory;
pub mod menu;
pub mod order;
pub mod realtime;
pub mod staff;
pub mod table;
