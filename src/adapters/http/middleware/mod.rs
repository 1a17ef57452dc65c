//! HTTP middleware for axum.
//!
//! - `auth` - bearer token verification and the `RequireAuth` extractor

pub mod auth;

pub use auth::{auth_middleware, AuthState, RequireAuth};
