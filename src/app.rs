//! Composition root.
//!
//! Builds every handler from a set of stores and the configuration, wires
//! the event bus to the real-time rooms and returns the HTTP state. Used by
//! the binary and by the integration tests, which pass in-memory stores.

use std::sync::Arc;

use axum::Router;
use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::adapters::auth::{Argon2PasswordHasher, JwtTokenService};
use crate::adapters::events::LocalEventBus;
use crate::adapters::http::auth::AuthHandlers;
use crate::adapters::http::daily_close::DailyCloseHandlers;
use crate::adapters::http::inventory::InventoryHandlers;
use crate::adapters::http::menu::MenuHandlers;
use crate::adapters::http::orders::OrderHandlers;
use crate::adapters::http::socket::SocketHandlers;
use crate::adapters::http::tables::TableHandlers;
use crate::adapters::http::{build_router, ApiHandlers};
use crate::adapters::memory::MemoryStore;
use crate::adapters::postgres::{
    PostgresDailyCloseRepository, PostgresInventoryRepository, PostgresMenuRepository,
    PostgresOrderRepository, PostgresTableRepository, PostgresUserRepository,
};
use crate::adapters::websocket::{
    InMemoryConnectionRegistry, NotificationBridge, RoomBroadcaster, RoomManager, WebSocketState,
};
use crate::application::handlers::auth::LoginHandler;
use crate::application::handlers::daily_close::{
    CloseDayHandler, DailyCloseStatusHandler, DailyReportHandler, ListClosesHandler,
    ReopenDayHandler,
};
use crate::application::handlers::inventory::{
    CreateIngredientHandler, GetIngredientHandler, ListAlertsHandler, ListIngredientsHandler,
    ListMovementsHandler, RecordMovementHandler, ResolveAlertHandler,
};
use crate::application::handlers::menu::{
    CreateCategoryHandler, CreateProductHandler, GetProductHandler, ListCategoriesHandler,
    ListProductsHandler, SetRecipeHandler, UpdateProductHandler,
};
use crate::application::handlers::order::{
    ChangeOrderStatusHandler, GetOrderHandler, ListOrdersHandler, PlaceOrderHandler,
    RecordPaymentHandler,
};
use crate::application::handlers::realtime::{SendEmergencyHandler, SendTableMessageHandler};
use crate::application::handlers::table::{
    CreateTableHandler, DeleteTableHandler, GetTableHandler, ListTablesHandler,
    SetTableStatusHandler,
};
use crate::application::LockGuard;
use crate::config::AppConfig;
use crate::domain::foundation::{DomainError, ErrorCode, Role};
use crate::domain::staff::StaffAccount;
use crate::ports::{
    ConnectionRegistry, DailyCloseRepository, EventPublisher, InventoryRepository, MenuRepository,
    NotificationBroadcaster, OrderRepository, PasswordHasher, TableRepository, TokenIssuer,
    TokenVerifier, UserRepository,
};

/// One implementation per repository port.
#[derive(Clone)]
pub struct Stores {
    pub tables: Arc<dyn TableRepository>,
    pub menu: Arc<dyn MenuRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub closes: Arc<dyn DailyCloseRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Stores {
    /// Every port backed by the same in-memory store.
    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            tables: store.clone(),
            menu: store.clone(),
            orders: store.clone(),
            inventory: store.clone(),
            closes: store.clone(),
            users: store,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            tables: Arc::new(PostgresTableRepository::new(pool.clone())),
            menu: Arc::new(PostgresMenuRepository::new(pool.clone())),
            orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
            inventory: Arc::new(PostgresInventoryRepository::new(pool.clone())),
            closes: Arc::new(PostgresDailyCloseRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool)),
        }
    }
}

/// A fully wired application.
pub struct App {
    pub handlers: ApiHandlers,
    pub stores: Stores,
    pub bus: Arc<LocalEventBus>,
    pub lock: Arc<LockGuard>,
    pub registry: Arc<dyn ConnectionRegistry>,
    pub rooms: Arc<RoomManager>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub issuer: Arc<dyn TokenIssuer>,
}

impl App {
    pub fn build(config: &AppConfig, stores: Stores) -> Self {
        let bus = Arc::new(LocalEventBus::new());
        let publisher: Arc<dyn EventPublisher> = bus.clone();

        let registry: Arc<dyn ConnectionRegistry> = Arc::new(InMemoryConnectionRegistry::new());
        let rooms = Arc::new(RoomManager::new());
        let broadcaster: Arc<dyn NotificationBroadcaster> =
            Arc::new(RoomBroadcaster::new(rooms.clone()));
        NotificationBridge::new_shared(broadcaster.clone()).register(bus.as_ref());

        let jwt = Arc::new(JwtTokenService::new(&config.auth));
        let verifier: Arc<dyn TokenVerifier> = jwt.clone();
        let issuer: Arc<dyn TokenIssuer> = jwt;
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());

        let lock = Arc::new(LockGuard::new(
            stores.closes.clone(),
            config.lifecycle.lock_policy(),
            config.lifecycle.calendar(),
        ));

        let emergency = Arc::new(SendEmergencyHandler::new(broadcaster.clone()));
        let table_messages = Arc::new(SendTableMessageHandler::new(
            stores.tables.clone(),
            broadcaster,
        ));

        let handlers = ApiHandlers {
            verifier: verifier.clone(),
            auth: AuthHandlers::new(Arc::new(LoginHandler::new(
                stores.users.clone(),
                hasher.clone(),
                issuer.clone(),
            ))),
            tables: TableHandlers {
                create: Arc::new(CreateTableHandler::new(
                    stores.tables.clone(),
                    lock.clone(),
                    config.server.public_base_url.clone(),
                )),
                set_status: Arc::new(SetTableStatusHandler::new(
                    stores.tables.clone(),
                    stores.orders.clone(),
                    lock.clone(),
                    publisher.clone(),
                )),
                delete: Arc::new(DeleteTableHandler::new(
                    stores.tables.clone(),
                    stores.orders.clone(),
                    lock.clone(),
                )),
                get: Arc::new(GetTableHandler::new(stores.tables.clone())),
                list: Arc::new(ListTablesHandler::new(stores.tables.clone())),
            },
            menu: MenuHandlers {
                create_category: Arc::new(CreateCategoryHandler::new(
                    stores.menu.clone(),
                    lock.clone(),
                )),
                list_categories: Arc::new(ListCategoriesHandler::new(stores.menu.clone())),
                create_product: Arc::new(CreateProductHandler::new(
                    stores.menu.clone(),
                    lock.clone(),
                )),
                update_product: Arc::new(UpdateProductHandler::new(
                    stores.menu.clone(),
                    lock.clone(),
                )),
                get_product: Arc::new(GetProductHandler::new(stores.menu.clone())),
                list_products: Arc::new(ListProductsHandler::new(stores.menu.clone())),
                set_recipe: Arc::new(SetRecipeHandler::new(
                    stores.menu.clone(),
                    stores.inventory.clone(),
                    lock.clone(),
                )),
            },
            orders: OrderHandlers {
                place: Arc::new(PlaceOrderHandler::new(
                    stores.tables.clone(),
                    stores.menu.clone(),
                    stores.orders.clone(),
                    lock.clone(),
                    publisher.clone(),
                )),
                change_status: Arc::new(ChangeOrderStatusHandler::new(
                    stores.orders.clone(),
                    stores.menu.clone(),
                    stores.inventory.clone(),
                    lock.clone(),
                    publisher.clone(),
                )),
                record_payment: Arc::new(RecordPaymentHandler::new(
                    stores.orders.clone(),
                    lock.clone(),
                    publisher.clone(),
                )),
                get: Arc::new(GetOrderHandler::new(stores.orders.clone())),
                list: Arc::new(ListOrdersHandler::new(stores.orders.clone())),
            },
            inventory: InventoryHandlers {
                create_ingredient: Arc::new(CreateIngredientHandler::new(
                    stores.inventory.clone(),
                    lock.clone(),
                )),
                get_ingredient: Arc::new(GetIngredientHandler::new(stores.inventory.clone())),
                list_ingredients: Arc::new(ListIngredientsHandler::new(stores.inventory.clone())),
                record_movement: Arc::new(RecordMovementHandler::new(
                    stores.inventory.clone(),
                    lock.clone(),
                    publisher.clone(),
                )),
                list_movements: Arc::new(ListMovementsHandler::new(stores.inventory.clone())),
                list_alerts: Arc::new(ListAlertsHandler::new(stores.inventory.clone())),
                resolve_alert: Arc::new(ResolveAlertHandler::new(
                    stores.inventory.clone(),
                    lock.clone(),
                )),
            },
            daily_close: DailyCloseHandlers {
                close: Arc::new(CloseDayHandler::new(
                    stores.closes.clone(),
                    stores.orders.clone(),
                    lock.clone(),
                    publisher.clone(),
                )),
                reopen: Arc::new(ReopenDayHandler::new(stores.closes.clone(), publisher)),
                status: Arc::new(DailyCloseStatusHandler::new(stores.closes.clone(), lock.clone())),
                list: Arc::new(ListClosesHandler::new(stores.closes.clone())),
                report: Arc::new(DailyReportHandler::new(
                    stores.orders.clone(),
                    stores.closes.clone(),
                    lock.clone(),
                )),
            },
            socket: SocketHandlers {
                emergency: emergency.clone(),
                table_message: table_messages.clone(),
                registry: registry.clone(),
                rooms: rooms.clone(),
            },
            websocket: WebSocketState {
                registry: registry.clone(),
                rooms: rooms.clone(),
                verifier,
                config: config.realtime.clone(),
                emergency,
                table_messages,
            },
        };

        Self {
            handlers,
            stores,
            bus,
            lock,
            registry,
            rooms,
            hasher,
            issuer,
        }
    }

    pub fn router(&self, config: &AppConfig) -> Router {
        build_router(self.handlers.clone(), &config.server)
    }

    /// Creates the configured bootstrap admin unless that email already has
    /// an account. Returns whether an account was created.
    pub async fn ensure_bootstrap_admin(&self, config: &AppConfig) -> Result<bool, DomainError> {
        let (Some(email), Some(password)) = (
            config.auth.bootstrap_admin_email.as_deref(),
            config.auth.bootstrap_admin_password.as_ref(),
        ) else {
            return Ok(false);
        };

        let account = StaffAccount::new(email, "Administrator", Role::Admin, String::new())?;
        if self.stores.users.find_by_email(&account.email).await?.is_some() {
            return Ok(false);
        }
        let password_hash = self
            .hasher
            .hash(password.expose_secret())
            .map_err(|e| DomainError::new(ErrorCode::InternalError, e.to_string()))?;
        let account = StaffAccount {
            password_hash,
            ..account
        };
        self.stores.users.save(&account).await?;
        tracing::info!(email = %account.email, "Bootstrap admin account created");
        Ok(true)
    }
}
