//! `/api/tables`

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;

use crate::application::handlers::table::{
    CreateTableCommand, CreateTableHandler, DeleteTableHandler, GetTableHandler,
    ListTablesHandler, SetTableStatusCommand, SetTableStatusHandler,
};
use crate::domain::foundation::TableId;
use crate::domain::table::{Table, TableStatus};

use super::error::ApiError;
use super::middleware::RequireAuth;
use super::parse_id;
use super::response::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct CreateTableRequest {
    pub number: i32,
    pub capacity: i32,
}

#[derive(Debug, Deserialize)]
pub struct SetTableStatusRequest {
    pub status: TableStatus,
}

#[derive(Clone)]
pub struct TableHandlers {
    pub create: Arc<CreateTableHandler>,
    pub set_status: Arc<SetTableStatusHandler>,
    pub delete: Arc<DeleteTableHandler>,
    pub get: Arc<GetTableHandler>,
    pub list: Arc<ListTablesHandler>,
}

/// GET /api/tables
pub async fn list_tables(
    State(handlers): State<TableHandlers>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse<Vec<Table>>, ApiError> {
    Ok(ApiResponse::ok(handlers.list.handle(&user).await?))
}

/// GET /api/tables/:id
pub async fn get_table(
    State(handlers): State<TableHandlers>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<Table>, ApiError> {
    let id: TableId = parse_id(&id, "table id")?;
    Ok(ApiResponse::ok(handlers.get.handle(id, &user).await?))
}

/// POST /api/tables
pub async fn create_table(
    State(handlers): State<TableHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateTableRequest>,
) -> Result<ApiResponse<Table>, ApiError> {
    let table = handlers
        .create
        .handle(
            CreateTableCommand {
                number: req.number,
                capacity: req.capacity,
            },
            &user,
        )
        .await?;
    Ok(ApiResponse::created(table))
}

/// PATCH /api/tables/:id/status
pub async fn set_table_status(
    State(handlers): State<TableHandlers>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<SetTableStatusRequest>,
) -> Result<ApiResponse<Table>, ApiError> {
    let table_id: TableId = parse_id(&id, "table id")?;
    let table = handlers
        .set_status
        .handle(
            SetTableStatusCommand {
                table_id,
                status: req.status,
            },
            &user,
        )
        .await?;
    Ok(ApiResponse::ok(table))
}

/// DELETE /api/tables/:id
pub async fn delete_table(
    State(handlers): State<TableHandlers>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id: TableId = parse_id(&id, "table id")?;
    handlers.delete.handle(id, &user).await?;
    Ok(ApiResponse::message("Table deleted"))
}

pub fn table_routes(handlers: TableHandlers) -> Router {
    Router::new()
        .route("/", get(list_tables).post(create_table))
        .route("/:id", get(get_table).delete(delete_table))
        .route("/:id/status", patch(set_table_status))
        .with_state(handlers)
}
