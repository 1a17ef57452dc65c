//! Staff login.

mod login;

pub use login::{LoginCommand, LoginHandler, LoginResult};
