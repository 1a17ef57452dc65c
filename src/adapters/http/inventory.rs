//! `/api/inventory`

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::handlers::inventory::{
    CreateIngredientCommand, CreateIngredientHandler, GetIngredientHandler, ListAlertsHandler,
    ListIngredientsHandler, ListMovementsHandler, RecordMovementCommand, RecordMovementHandler,
    ResolveAlertHandler,
};
use crate::domain::foundation::{IngredientId, StockAlertId};
use crate::domain::inventory::{Ingredient, MovementType, StockAlert, StockMovement};
use crate::ports::MovementOutcome;

use super::error::ApiError;
use super::middleware::RequireAuth;
use super::parse_id;
use super::response::ApiResponse;

const DEFAULT_MOVEMENT_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngredientRequest {
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub current_stock: Decimal,
    #[serde(default)]
    pub min_stock: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMovementRequest {
    pub ingredient_id: IngredientId,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovementParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertParams {
    #[serde(default = "default_open_only")]
    pub open_only: bool,
}

fn default_open_only() -> bool {
    true
}

#[derive(Clone)]
pub struct InventoryHandlers {
    pub create_ingredient: Arc<CreateIngredientHandler>,
    pub get_ingredient: Arc<GetIngredientHandler>,
    pub list_ingredients: Arc<ListIngredientsHandler>,
    pub record_movement: Arc<RecordMovementHandler>,
    pub list_movements: Arc<ListMovementsHandler>,
    pub list_alerts: Arc<ListAlertsHandler>,
    pub resolve_alert: Arc<ResolveAlertHandler>,
}

/// GET /api/inventory/ingredients
pub async fn list_ingredients(
    State(handlers): State<InventoryHandlers>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse<Vec<Ingredient>>, ApiError> {
    Ok(ApiResponse::ok(handlers.list_ingredients.handle(&user).await?))
}

/// POST /api/inventory/ingredients
pub async fn create_ingredient(
    State(handlers): State<InventoryHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateIngredientRequest>,
) -> Result<ApiResponse<Ingredient>, ApiError> {
    let ingredient = handlers
        .create_ingredient
        .handle(
            CreateIngredientCommand {
                name: req.name,
                unit: req.unit,
                current_stock: req.current_stock,
                min_stock: req.min_stock,
            },
            &user,
        )
        .await?;
    Ok(ApiResponse::created(ingredient))
}

/// GET /api/inventory/ingredients/:id
pub async fn get_ingredient(
    State(handlers): State<InventoryHandlers>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<Ingredient>, ApiError> {
    let id: IngredientId = parse_id(&id, "ingredient id")?;
    Ok(ApiResponse::ok(handlers.get_ingredient.handle(id, &user).await?))
}

/// GET /api/inventory/ingredients/:id/movements?limit=
pub async fn list_movements(
    State(handlers): State<InventoryHandlers>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Query(params): Query<MovementParams>,
) -> Result<ApiResponse<Vec<StockMovement>>, ApiError> {
    let id: IngredientId = parse_id(&id, "ingredient id")?;
    let limit = params.limit.unwrap_or(DEFAULT_MOVEMENT_LIMIT);
    Ok(ApiResponse::ok(
        handlers.list_movements.handle(id, limit, &user).await?,
    ))
}

/// POST /api/inventory/movements
pub async fn record_movement(
    State(handlers): State<InventoryHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<RecordMovementRequest>,
) -> Result<ApiResponse<MovementOutcome>, ApiError> {
    let outcome = handlers
        .record_movement
        .handle(
            RecordMovementCommand {
                ingredient_id: req.ingredient_id,
                movement_type: req.movement_type,
                quantity: req.quantity,
                reason: req.reason,
            },
            &user,
        )
        .await?;
    Ok(ApiResponse::created(outcome))
}

/// GET /api/inventory/alerts?openOnly=
pub async fn list_alerts(
    State(handlers): State<InventoryHandlers>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<AlertParams>,
) -> Result<ApiResponse<Vec<StockAlert>>, ApiError> {
    Ok(ApiResponse::ok(
        handlers.list_alerts.handle(params.open_only, &user).await?,
    ))
}

/// POST /api/inventory/alerts/:id/resolve
pub async fn resolve_alert(
    State(handlers): State<InventoryHandlers>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<StockAlert>, ApiError> {
    let id: StockAlertId = parse_id(&id, "alert id")?;
    Ok(ApiResponse::ok(handlers.resolve_alert.handle(id, &user).await?))
}

pub fn inventory_routes(handlers: InventoryHandlers) -> Router {
    Router::new()
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
        .route("/ingredients/:id", get(get_ingredient))
        .route("/ingredients/:id/movements", get(list_movements))
        .route("/movements", post(record_movement))
        .route("/alerts", get(list_alerts))
        .route("/alerts/:id/resolve", post(resolve_alert))
        .with_state(handlers)
}
