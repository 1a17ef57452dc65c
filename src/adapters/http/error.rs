//! Maps module errors onto HTTP responses.
//!
//! | category       | status |
//! |----------------|--------|
//! | validation     | 400    |
//! | authentication | 401    |
//! | authorization  | 403    |
//! | not found      | 404    |
//! | conflict       | 409    |
//! | locked         | 423    |
//! | internal       | 500    |
//!
//! Internal errors keep their cause in the log and send a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::application::handlers::realtime::MessageError;
use crate::domain::daily_close::DailyCloseError;
use crate::domain::foundation::{AuthError, ErrorCategory, ErrorCode, ValidationError};
use crate::domain::inventory::InventoryError;
use crate::domain::menu::MenuError;
use crate::domain::order::OrderError;
use crate::domain::table::TableError;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: String,
    message: String,
    details: Option<Value>,
}

fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::Validation => StatusCode::BAD_REQUEST,
        ErrorCategory::Authentication => StatusCode::UNAUTHORIZED,
        ErrorCategory::Authorization => StatusCode::FORBIDDEN,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Conflict => StatusCode::CONFLICT,
        ErrorCategory::Locked => StatusCode::LOCKED,
        ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: status_for(code.category()),
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    fn from_validation(code: ErrorCode, err: &ValidationError) -> Self {
        Self::new(code, err.to_string()).with_details(json!({ "field": err.field() }))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            tracing::error!(code = %self.code, cause = %self.message, "Request failed");
            "Internal server error".to_string()
        } else {
            self.message
        };

        let mut body = json!({
            "success": false,
            "error": self.code,
            "message": message,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::from_validation(ErrorCode::ValidationFailed, &err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InsufficientPermissions => Self::new(ErrorCode::Forbidden, err.to_string()),
            AuthError::ServiceUnavailable(_) => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                code: "SERVICE_UNAVAILABLE".to_string(),
                message: err.to_string(),
                details: None,
            },
            _ => Self::new(ErrorCode::Unauthorized, err.to_string()),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match &err {
            OrderError::Forbidden(auth) => auth.clone().into(),
            OrderError::Validation(v) => Self::from_validation(err.code(), v),
            OrderError::InsufficientStock(shortfalls) => Self::new(err.code(), err.to_string())
                .with_details(json!({ "shortfalls": shortfalls })),
            _ => Self::new(err.code(), err.to_string()),
        }
    }
}

impl From<TableError> for ApiError {
    fn from(err: TableError) -> Self {
        match &err {
            TableError::Forbidden(auth) => auth.clone().into(),
            TableError::Validation(v) => Self::from_validation(err.code(), v),
            _ => Self::new(err.code(), err.to_string()),
        }
    }
}

impl From<MenuError> for ApiError {
    fn from(err: MenuError) -> Self {
        match &err {
            MenuError::Forbidden(auth) => auth.clone().into(),
            MenuError::Validation(v) => Self::from_validation(err.code(), v),
            _ => Self::new(err.code(), err.to_string()),
        }
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        match &err {
            InventoryError::Forbidden(auth) => auth.clone().into(),
            InventoryError::Validation(v) => Self::from_validation(err.code(), v),
            InventoryError::InsufficientStock {
                ingredient,
                requested,
                available,
            } => Self::new(err.code(), err.to_string()).with_details(json!({
                "ingredient": ingredient,
                "requested": requested,
                "available": available,
            })),
            _ => Self::new(err.code(), err.to_string()),
        }
    }
}

impl From<DailyCloseError> for ApiError {
    fn from(err: DailyCloseError) -> Self {
        match &err {
            DailyCloseError::Forbidden(auth) => auth.clone().into(),
            DailyCloseError::Validation(v) => Self::from_validation(err.code(), v),
            _ => Self::new(err.code(), err.to_string()),
        }
    }
}

impl From<MessageError> for ApiError {
    fn from(err: MessageError) -> Self {
        match &err {
            MessageError::Forbidden(auth) => auth.clone().into(),
            MessageError::Validation(v) => Self::from_validation(err.code(), v),
            _ => Self::new(err.code(), err.to_string()),
        }
    }
}
