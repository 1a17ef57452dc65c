//! Authentication adapters.
//!
//! - `jwt` - HS256 tokens signed with the configured secret
//! - `password` - Argon2id hashing
//! - `mock` - Fixed-token implementations for tests

mod jwt;
mod mock;
mod password;

pub use jwt::JwtTokenService;
pub use mock::{MockTokenIssuer, MockTokenVerifier, PlainTextHasher};
pub use password::Argon2PasswordHasher;
