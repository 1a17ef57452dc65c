//! Shared harness: a fully wired app on the in-memory store, driven through
//! the real router.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

use comanda::adapters::websocket::ServerMessage;
use comanda::adapters::MemoryStore;
use comanda::app::{App, Stores};
use comanda::config::{AppConfig, AuthConfig};
use comanda::domain::foundation::{AuthenticatedUser, ConnectionId, Role, UserId};
use comanda::domain::realtime::Room;

pub struct TestApp {
    pub app: App,
    pub config: AppConfig,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::new(AuthConfig::new("integration-secret")))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let app = App::build(&config, Stores::memory(MemoryStore::new()));
        let router = app.router(&config);
        Self {
            app,
            config,
            router,
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn user(role: Role) -> AuthenticatedUser {
        let id = format!("{}-1", role.as_str().to_lowercase());
        AuthenticatedUser::new(UserId::new(id).unwrap(), format!("{} One", role), role)
    }

    pub fn token(&self, role: Role) -> String {
        self.app.issuer.issue(&Self::user(role)).unwrap().token
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, role: Role) -> (StatusCode, Value) {
        let token = self.token(role);
        self.call(Method::GET, uri, Some(&token), None).await
    }

    pub async fn post(&self, uri: &str, role: Role, body: Value) -> (StatusCode, Value) {
        let token = self.token(role);
        self.call(Method::POST, uri, Some(&token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, role: Role, body: Value) -> (StatusCode, Value) {
        let token = self.token(role);
        self.call(Method::PATCH, uri, Some(&token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, role: Role, body: Value) -> (StatusCode, Value) {
        let token = self.token(role);
        self.call(Method::PUT, uri, Some(&token), Some(body)).await
    }

    /// A socket-less connection: joins the role's rooms and hands back the
    /// queue a socket task would drain.
    pub async fn listener(
        &self,
        role: Role,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<ServerMessage>, Vec<Room>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::new();
        let rooms = self
            .app
            .handlers
            .websocket
            .attach(connection_id, &Self::user(role), tx)
            .await;
        (connection_id, rx, rooms)
    }

    // ---- seeding through the API ----

    pub async fn create_table(&self, number: i32) -> Value {
        let (status, body) = self
            .post("/api/tables", Role::Admin, json!({ "number": number, "capacity": 4 }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"].clone()
    }

    pub async fn create_product(&self, name: &str, price: &str) -> Value {
        let (status, category) = self
            .post(
                "/api/categories",
                Role::Manager,
                json!({ "name": format!("{} category", name) }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", category);

        let (status, product) = self
            .post(
                "/api/products",
                Role::Manager,
                json!({
                    "categoryId": category["data"]["id"],
                    "name": name,
                    "price": price,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", product);
        product["data"].clone()
    }

    pub async fn create_ingredient(&self, name: &str, stock: &str, min: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/inventory/ingredients",
                Role::Manager,
                json!({ "name": name, "unit": "kg", "currentStock": stock, "minStock": min }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"].clone()
    }

    pub async fn set_recipe(&self, product: &Value, lines: &[(&Value, &str)]) {
        let ingredients: Vec<Value> = lines
            .iter()
            .map(|(ingredient, qty)| json!({ "ingredientId": ingredient["id"], "quantity": qty }))
            .collect();
        let uri = format!("/api/products/{}/recipe", id(product));
        let (status, body) = self
            .put(&uri, Role::Manager, json!({ "ingredients": ingredients }))
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    pub async fn place_order(&self, table: &Value, items: &[(&Value, i32)]) -> (StatusCode, Value) {
        let items: Vec<Value> = items
            .iter()
            .map(|(product, quantity)| json!({ "productId": product["id"], "quantity": quantity }))
            .collect();
        self.post(
            "/api/orders",
            Role::Waiter,
            json!({ "tableId": table["id"], "items": items }),
        )
        .await
    }

    pub async fn move_order(&self, order: &Value, role: Role, status: &str) -> (StatusCode, Value) {
        let uri = format!("/api/orders/{}/status", id(order));
        self.patch(&uri, role, json!({ "status": status })).await
    }

    pub async fn table(&self, table: &Value) -> Value {
        let (status, body) = self
            .get(&format!("/api/tables/{}", id(table)), Role::Waiter)
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["data"].clone()
    }

    pub async fn ingredient(&self, ingredient: &Value) -> Value {
        let uri = format!("/api/inventory/ingredients/{}", id(ingredient));
        let (status, body) = self.get(&uri, Role::Manager).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["data"].clone()
    }
}

pub fn id(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

/// Parses a decimal the way the API serializes it.
pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        Value::Number(n) => n.to_string().parse().unwrap(),
        other => panic!("not a decimal: {}", other),
    }
}

/// Drains everything queued so far.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}

/// `(event, room)` of every queued notification.
pub fn events(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<(String, Room)> {
    drain(rx)
        .into_iter()
        .filter_map(|message| match message {
            ServerMessage::Notification { event, room, .. } => Some((event, room)),
            _ => None,
        })
        .collect()
}
