//! `/api/orders`

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::application::handlers::order::{
    ChangeOrderStatusCommand, ChangeOrderStatusHandler, GetOrderHandler, ListOrdersHandler,
    ListOrdersQuery, OrderItemRequest, PlaceOrderCommand, PlaceOrderHandler,
    RecordPaymentCommand, RecordPaymentHandler,
};
use crate::domain::foundation::{OrderId, ProductId, TableId};
use crate::domain::inventory::{StockAlert, StockMovement};
use crate::domain::order::{Order, OrderStatus, PaymentMethod};
use crate::ports::OrderFilter;

use super::error::ApiError;
use super::middleware::RequireAuth;
use super::parse_id;
use super::response::{ApiResponse, PageParams};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemBody {
    pub product_id: ProductId,
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub table_id: TableId,
    pub items: Vec<OrderItemBody>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListParams {
    pub status: Option<OrderStatus>,
    pub table_id: Option<TableId>,
    #[serde(default)]
    pub active_only: bool,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub order: Order,
    pub table_released: bool,
    pub movements: Vec<StockMovement>,
    pub alerts: Vec<StockAlert>,
}

#[derive(Clone)]
pub struct OrderHandlers {
    pub place: Arc<PlaceOrderHandler>,
    pub change_status: Arc<ChangeOrderStatusHandler>,
    pub record_payment: Arc<RecordPaymentHandler>,
    pub get: Arc<GetOrderHandler>,
    pub list: Arc<ListOrdersHandler>,
}

/// GET /api/orders?status=&tableId=&activeOnly=&page=&limit=
pub async fn list_orders(
    State(handlers): State<OrderHandlers>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<OrderListParams>,
) -> Result<ApiResponse<Vec<Order>>, ApiError> {
    let page = PageParams {
        page: params.page,
        limit: params.limit,
    }
    .to_request()?;
    let query = ListOrdersQuery {
        filter: OrderFilter {
            status: params.status,
            table_id: params.table_id,
            active_only: params.active_only,
        },
        page,
    };
    Ok(ApiResponse::paginated(handlers.list.handle(query, &user).await?))
}

/// GET /api/orders/:id
pub async fn get_order(
    State(handlers): State<OrderHandlers>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<Order>, ApiError> {
    let id: OrderId = parse_id(&id, "order id")?;
    Ok(ApiResponse::ok(handlers.get.handle(id, &user).await?))
}

/// POST /api/orders
pub async fn place_order(
    State(handlers): State<OrderHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<ApiResponse<Order>, ApiError> {
    let cmd = PlaceOrderCommand {
        table_id: req.table_id,
        items: req
            .items
            .into_iter()
            .map(|item| OrderItemRequest {
                product_id: item.product_id,
                quantity: item.quantity,
                notes: item.notes,
            })
            .collect(),
        notes: req.notes,
    };
    let order = handlers.place.handle(cmd, &user).await?;
    Ok(ApiResponse::created(order))
}

/// PATCH /api/orders/:id/status
pub async fn change_order_status(
    State(handlers): State<OrderHandlers>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<ApiResponse<StatusChangeResponse>, ApiError> {
    let order_id: OrderId = parse_id(&id, "order id")?;
    let result = handlers
        .change_status
        .handle(
            ChangeOrderStatusCommand {
                order_id,
                status: req.status,
            },
            &user,
        )
        .await?;
    Ok(ApiResponse::ok(StatusChangeResponse {
        order: result.order,
        table_released: result.table_released,
        movements: result.movements,
        alerts: result.alerts,
    }))
}

/// POST /api/orders/:id/payment
pub async fn record_payment(
    State(handlers): State<OrderHandlers>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> Result<ApiResponse<Order>, ApiError> {
    let order_id: OrderId = parse_id(&id, "order id")?;
    let order = handlers
        .record_payment
        .handle(
            RecordPaymentCommand {
                order_id,
                method: req.method,
            },
            &user,
        )
        .await?;
    Ok(ApiResponse::ok(order).with_message("Payment recorded"))
}

pub fn order_routes(handlers: OrderHandlers) -> Router {
    Router::new()
        .route("/", get(list_orders).post(place_order))
        .route("/:id", get(get_order))
        .route("/:id/status", patch(change_order_status))
        .route("/:id/payment", post(record_payment))
        .with_state(handlers)
}
