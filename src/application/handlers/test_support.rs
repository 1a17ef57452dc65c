//! Shared fixtures for handler tests: one in-memory store, a recording bus
//! and a lock guard reading the same store.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::adapters::events::LocalEventBus;
use crate::adapters::memory::MemoryStore;
use crate::application::LockGuard;
use crate::domain::daily_close::{BusinessCalendar, DailyClose, DayTotals, LockPolicy};
use crate::domain::foundation::{AuthenticatedUser, Role, UserId};
use crate::domain::inventory::{Ingredient, Recipe, RecipeLine};
use crate::domain::menu::{Category, Product};
use crate::domain::table::Table;
use crate::ports::{DailyCloseRepository, InventoryRepository, MenuRepository, TableRepository};

pub(crate) struct Fixture {
    pub store: Arc<MemoryStore>,
    pub bus: Arc<LocalEventBus>,
    pub lock: Arc<LockGuard>,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let lock = Arc::new(LockGuard::new(
            store.clone(),
            LockPolicy::new(true),
            BusinessCalendar::utc(),
        ));
        Self {
            store,
            bus: Arc::new(LocalEventBus::recording()),
            lock,
        }
    }

    pub async fn table(&self, number: i32) -> Table {
        let table = Table::new(number, 4, "http://localhost:5173").unwrap();
        TableRepository::save(self.store.as_ref(), &table).await.unwrap();
        table
    }

    pub async fn product(&self, name: &str, price: &str) -> Product {
        let category = Category::new(format!("{} category", name), None).unwrap();
        self.store.save_category(&category).await.unwrap();
        let product = Product::new(category.id, name.to_string(), None, price.parse().unwrap())
            .unwrap();
        self.store.save_product(&product).await.unwrap();
        product
    }

    pub async fn ingredient(&self, name: &str, stock: i64, min: i64) -> Ingredient {
        let ingredient =
            Ingredient::new(name, "kg", Decimal::from(stock), Decimal::from(min)).unwrap();
        self.store.save_ingredient(&ingredient).await.unwrap();
        ingredient
    }

    pub async fn recipe(&self, product: &Product, lines: &[(&Ingredient, i64)]) {
        let recipe = Recipe::new(
            *product.id(),
            lines
                .iter()
                .map(|(ingredient, qty)| RecipeLine {
                    ingredient_id: *ingredient.id(),
                    quantity: Decimal::from(*qty),
                })
                .collect(),
        )
        .unwrap();
        self.store.save_recipe(&recipe).await.unwrap();
    }

    pub async fn close_today(&self) -> DailyClose {
        let close = DailyClose::close(
            BusinessCalendar::utc().today(),
            UserId::new("manager-1").unwrap(),
            DayTotals::default(),
            0,
            None,
        )
        .unwrap();
        DailyCloseRepository::save(self.store.as_ref(), &close).await.unwrap();
        close
    }
}

pub(crate) fn user(role: Role) -> AuthenticatedUser {
    let id = format!("{}-1", role.as_str().to_lowercase());
    AuthenticatedUser::new(UserId::new(id).unwrap(), "Test User", role)
}
