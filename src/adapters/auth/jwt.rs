//! HS256 access tokens for staff logins.
//!
//! One signing secret from `AuthConfig`; the same service issues tokens at
//! login and verifies them on every request and socket upgrade.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, Role, Timestamp, UserId};
use crate::ports::{IssuedToken, TokenIssuer, TokenVerifier};

#[derive(Debug, Serialize, Deserialize)]
struct StaffClaims {
    sub: String,
    role: String,
    name: String,
    iat: i64,
    exp: i64,
}

pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtTokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: config.token_ttl(),
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl TokenIssuer for JwtTokenService {
    fn issue(&self, user: &AuthenticatedUser) -> Result<IssuedToken, AuthError> {
        let issued_at = Timestamp::now();
        let expires_at = issued_at.plus_secs(self.ttl.as_secs() as i64);
        let claims = StaffClaims {
            sub: user.id.to_string(),
            role: user.role.as_str().to_string(),
            name: user.name.clone(),
            iat: issued_at.as_unix_secs(),
            exp: expires_at.as_unix_secs(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign access token");
            AuthError::service_unavailable("token signing failed")
        })?;
        Ok(IssuedToken { token, expires_at })
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenService {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<StaffClaims>(token, &self.decoding, &Self::validation()).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                _ => {
                    tracing::warn!(error = %e, "Token validation failed");
                    AuthError::InvalidToken
                }
            }
        })?;

        let claims = data.claims;
        let id = UserId::new(claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let role: Role = claims.role.parse().map_err(|_| AuthError::InvalidToken)?;
        Ok(AuthenticatedUser::new(id, claims.name, role))
    }
}
