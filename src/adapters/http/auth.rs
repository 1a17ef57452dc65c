//! `/api/auth` - login and identity echo.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::application::handlers::auth::{LoginCommand, LoginHandler};
use crate::domain::foundation::{AuthenticatedUser, Role, Timestamp, UserId};

use super::error::ApiError;
use super::middleware::RequireAuth;
use super::response::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

impl From<AuthenticatedUser> for UserView {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: Timestamp,
    pub user: UserView,
}

#[derive(Clone)]
pub struct AuthHandlers {
    login: Arc<LoginHandler>,
}

impl AuthHandlers {
    pub fn new(login: Arc<LoginHandler>) -> Self {
        Self { login }
    }
}

/// POST /api/auth/login
pub async fn login(
    State(handlers): State<AuthHandlers>,
    Json(req): Json<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, ApiError> {
    let result = handlers
        .login
        .handle(LoginCommand {
            email: req.email,
            password: req.password,
        })
        .await?;
    Ok(ApiResponse::ok(LoginResponse {
        token: result.token,
        expires_at: result.expires_at,
        user: result.user.into(),
    }))
}

/// GET /api/auth/me
pub async fn me(RequireAuth(user): RequireAuth) -> ApiResponse<UserView> {
    ApiResponse::ok(user.into())
}

pub fn auth_routes(handlers: AuthHandlers) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
        .with_state(handlers)
}
