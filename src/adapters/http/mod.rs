//! HTTP adapter - the REST API under `/api`.
//!
//! Each area has a `*Handlers` state bundle and a `*_routes` builder;
//! [`router::build_router`] nests them and applies the middleware stack.

pub mod auth;
pub mod daily_close;
pub mod error;
pub mod health;
pub mod inventory;
pub mod menu;
pub mod middleware;
pub mod orders;
pub mod response;
pub mod router;
pub mod socket;
pub mod tables;

use std::str::FromStr;

pub use error::ApiError;
pub use response::ApiResponse;
pub use router::{build_router, ApiHandlers};

/// Parses a path id, answering 400 on garbage instead of axum's plain-text rejection.
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {}: {}", what, raw)))
}
