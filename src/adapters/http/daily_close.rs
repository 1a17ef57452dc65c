//! `/api/daily-close` and `/api/reports`

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::application::handlers::daily_close::{
    CloseDayCommand, CloseDayHandler, CloseStatus, DailyCloseStatusHandler, DailyReport,
    DailyReportHandler, ListClosesHandler, ReopenDayHandler,
};
use crate::domain::daily_close::DailyClose;
use crate::domain::foundation::DailyCloseId;

use super::error::ApiError;
use super::middleware::RequireAuth;
use super::parse_id;
use super::response::ApiResponse;

const DEFAULT_CLOSE_LIMIT: u32 = 30;

#[derive(Debug, Default, Deserialize)]
pub struct CloseDayRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListClosesParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct DailyCloseHandlers {
    pub close: Arc<CloseDayHandler>,
    pub reopen: Arc<ReopenDayHandler>,
    pub status: Arc<DailyCloseStatusHandler>,
    pub list: Arc<ListClosesHandler>,
    pub report: Arc<DailyReportHandler>,
}

/// POST /api/daily-close
pub async fn close_day(
    State(handlers): State<DailyCloseHandlers>,
    RequireAuth(user): RequireAuth,
    body: Option<Json<CloseDayRequest>>,
) -> Result<ApiResponse<DailyClose>, ApiError> {
    let notes = body.and_then(|Json(req)| req.notes);
    let close = handlers.close.handle(CloseDayCommand { notes }, &user).await?;
    Ok(ApiResponse::created(close).with_message("Business day closed"))
}

/// POST /api/daily-close/:id/reopen
pub async fn reopen_day(
    State(handlers): State<DailyCloseHandlers>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<DailyClose>, ApiError> {
    let id: DailyCloseId = parse_id(&id, "daily close id")?;
    let close = handlers.reopen.handle(id, &user).await?;
    Ok(ApiResponse::ok(close).with_message("Business day reopened"))
}

/// GET /api/daily-close/status
pub async fn close_status(
    State(handlers): State<DailyCloseHandlers>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse<CloseStatus>, ApiError> {
    Ok(ApiResponse::ok(handlers.status.handle(&user).await?))
}

/// GET /api/daily-close?limit=
pub async fn list_closes(
    State(handlers): State<DailyCloseHandlers>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<ListClosesParams>,
) -> Result<ApiResponse<Vec<DailyClose>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_CLOSE_LIMIT);
    Ok(ApiResponse::ok(handlers.list.handle(limit, &user).await?))
}

/// GET /api/reports/daily?date=YYYY-MM-DD
pub async fn daily_report(
    State(handlers): State<DailyCloseHandlers>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<ReportParams>,
) -> Result<ApiResponse<DailyReport>, ApiError> {
    Ok(ApiResponse::ok(
        handlers.report.handle(params.date, &user).await?,
    ))
}

pub fn daily_close_routes(handlers: DailyCloseHandlers) -> Router {
    Router::new()
        .route("/", get(list_closes).post(close_day))
        .route("/status", get(close_status))
        .route("/:id/reopen", post(reopen_day))
        .with_state(handlers)
}

pub fn report_routes(handlers: DailyCloseHandlers) -> Router {
    Router::new()
        .route("/daily", get(daily_report))
        .with_state(handlers)
}
