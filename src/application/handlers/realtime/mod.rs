//! Operator messages pushed straight to rooms: emergencies and table
//! messages. Neither is persisted nor gated by the daily close.

mod send_message;

pub use send_message::{
    MessageError, SendEmergencyCommand, SendEmergencyHandler, SendTableMessageCommand,
    SendTableMessageHandler,
};
