//! Success envelope shared by every REST endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;
use crate::ports::{Page, PageInfo, PageRequest};

/// `{success, data?, message?, pagination?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
            status: StatusCode::OK,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn paginated(page: Page<T>) -> Self {
        let info = page.info();
        Self {
            pagination: Some(info),
            ..Self::ok(page.items)
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// `?page=&limit=` on list endpoints.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn to_request(self) -> Result<PageRequest, ValidationError> {
        PageRequest::from_query(self.page, self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("message").is_none());
        assert!(json.get("pagination").is_none());
    }

    #[test]
    fn paginated_reports_total_pages() {
        let page = Page::new(vec!["a"; 20], 45, PageRequest::new(1, 20).unwrap());
        let json = serde_json::to_value(ApiResponse::paginated(page)).unwrap();
        assert_eq!(json["pagination"]["total"], 45);
        assert_eq!(json["pagination"]["totalPages"], 3);
    }

    #[test]
    fn created_uses_201() {
        let response = ApiResponse::created("x").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn oversized_limit_is_rejected() {
        let params = PageParams {
            page: Some(1),
            limit: Some(500),
        };
        assert!(params.to_request().is_err());
    }
}
