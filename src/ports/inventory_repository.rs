//! Inventory repository port.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::foundation::{DomainError, IngredientId, StockAlertId, Timestamp, UserId};
use crate::domain::inventory::{Ingredient, MovementType, StockAlert, StockMovement};

/// A manual stock movement to record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRequest {
    pub ingredient_id: IngredientId,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub reason: Option<String>,
    pub created_by: UserId,
    pub at: Timestamp,
}

/// What a recorded movement left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementOutcome {
    pub ingredient: Ingredient,
    pub movement: StockMovement,
    pub alert: Option<StockAlert>,
}

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// # Errors
    ///
    /// - `AlreadyExists` (detail `name`) for a duplicate ingredient name
    async fn save_ingredient(&self, ingredient: &Ingredient) -> Result<(), DomainError>;

    async fn find_ingredient(&self, id: &IngredientId) -> Result<Option<Ingredient>, DomainError>;

    /// Ingredients among `ids` that exist.
    async fn find_ingredients(&self, ids: &[IngredientId]) -> Result<Vec<Ingredient>, DomainError>;

    /// Ordered by name.
    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, DomainError>;

    /// Locks the ingredient, applies the movement, inserts the movement row
    /// and any alert it raises, all in one transaction.
    ///
    /// # Errors
    ///
    /// - `IngredientNotFound`
    /// - `InsufficientStock` (details `ingredient`, `requested`, `available`)
    ///   when an OUT or WASTE would go below zero; nothing is written
    /// - `ValidationFailed` for a non-positive quantity, or a quantity or
    ///   resulting level outside `NUMERIC(12, 3)`
    async fn record_movement(
        &self,
        request: &MovementRequest,
    ) -> Result<MovementOutcome, DomainError>;

    /// Newest first.
    async fn list_movements(
        &self,
        ingredient_id: &IngredientId,
        limit: u32,
    ) -> Result<Vec<StockMovement>, DomainError>;

    async fn list_alerts(&self, open_only: bool) -> Result<Vec<StockAlert>, DomainError>;

    /// Resolves an alert. Resolving twice keeps the first timestamp.
    ///
    /// # Errors
    ///
    /// - `AlertNotFound`
    async fn resolve_alert(
        &self,
        id: &StockAlertId,
        at: Timestamp,
    ) -> Result<StockAlert, DomainError>;
}
