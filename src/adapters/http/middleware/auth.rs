//! Authentication middleware and extractor.
//!
//! ```text
//! Request → auth_middleware → AuthenticatedUser in extensions
//!                                      ↓
//!                              Handler → RequireAuth reads it back
//! ```
//!
//! A missing header passes through untouched so public routes (login,
//! health, menu reads) keep working; `RequireAuth` turns that into a 401.
//! A header that fails verification is rejected right here.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::adapters::http::error::ApiError;
use crate::domain::foundation::AuthenticatedUser;
use crate::ports::TokenVerifier;

pub type AuthState = Arc<dyn TokenVerifier>;

pub async fn auth_middleware(
    State(verifier): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .map(str::to_string);

    let Some(token) = token else {
        return next.run(request).await;
    };

    match verifier.verify(&token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            ApiError::from(e).into_response()
        }
    }
}

/// Requires a verified identity.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| ApiError::unauthenticated("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockTokenVerifier;
    use crate::domain::foundation::{Role, UserId};
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn cashier() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new("cashier-1").unwrap(), "Caja", Role::Cashier)
    }

    fn app() -> Router {
        let verifier: AuthState =
            Arc::new(MockTokenVerifier::new().with_user("good-token", cashier()));
        Router::new()
            .route(
                "/me",
                get(|RequireAuth(user): RequireAuth| async move { user.name }),
            )
            .route("/open", get(|| async { "open" }))
            .layer(middleware::from_fn_with_state(verifier, auth_middleware))
    }

    async fn status(uri: &str, token: Option<&str>) -> StatusCode {
        let mut request = axum::http::Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn valid_token_reaches_handler() {
        assert_eq!(status("/me", Some("good-token")).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_token_is_401_only_where_required() {
        assert_eq!(status("/me", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status("/open", None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn bad_token_is_rejected_even_on_open_routes() {
        assert_eq!(status("/open", Some("forged")).await, StatusCode::UNAUTHORIZED);
    }
}
