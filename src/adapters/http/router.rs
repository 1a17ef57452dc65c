//! Full application router.
//!
//! The stack is applied bottom-up:
//!
//! 1. CORS
//! 2. Request id on incoming requests
//! 3. Request/response tracing
//! 4. Request id echoed on the response
//! 5. Request timeout
//! 6. Bearer token verification and gzip on `/api`

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::{middleware, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::adapters::websocket::{websocket_router, WebSocketState};
use crate::config::ServerConfig;

use super::auth::{auth_routes, AuthHandlers};
use super::daily_close::{daily_close_routes, report_routes, DailyCloseHandlers};
use super::health::health_routes;
use super::inventory::{inventory_routes, InventoryHandlers};
use super::menu::{category_routes, product_routes, MenuHandlers};
use super::middleware::{auth_middleware, AuthState};
use super::orders::{order_routes, OrderHandlers};
use super::socket::{socket_routes, SocketHandlers};
use super::tables::{table_routes, TableHandlers};

/// Everything the REST and socket routes need.
#[derive(Clone)]
pub struct ApiHandlers {
    pub verifier: AuthState,
    pub auth: AuthHandlers,
    pub tables: TableHandlers,
    pub menu: MenuHandlers,
    pub orders: OrderHandlers,
    pub inventory: InventoryHandlers,
    pub daily_close: DailyCloseHandlers,
    pub socket: SocketHandlers,
    pub websocket: WebSocketState,
}

pub fn api_routes(handlers: ApiHandlers) -> Router {
    Router::new()
        .nest("/auth", auth_routes(handlers.auth))
        .nest("/tables", table_routes(handlers.tables))
        .nest("/categories", category_routes(handlers.menu.clone()))
        .nest("/products", product_routes(handlers.menu))
        .nest("/orders", order_routes(handlers.orders))
        .nest("/inventory", inventory_routes(handlers.inventory))
        .nest("/daily-close", daily_close_routes(handlers.daily_close.clone()))
        .nest("/reports", report_routes(handlers.daily_close))
        .nest("/socket", socket_routes(handlers.socket))
        .layer(middleware::from_fn_with_state(
            handlers.verifier,
            auth_middleware,
        ))
        .layer(CompressionLayer::new())
}

pub fn build_router(handlers: ApiHandlers, config: &ServerConfig) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");
    let websocket = websocket_router().with_state(handlers.websocket.clone());

    Router::new()
        .merge(health_routes())
        .merge(websocket)
        .nest("/api", api_routes(handlers))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors_layer(config))
}

/// No configured origins means any origin (development default).
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    let origins: Vec<HeaderValue> = config
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(origins)
    }
}

