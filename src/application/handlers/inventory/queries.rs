//! Inventory read side. Staff only; no daily-close gate.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, IngredientId, Role};
use crate::domain::inventory::{Ingredient, InventoryError, StockAlert, StockMovement};
use crate::ports::InventoryRepository;

/// Upper bound on a movement history page.
pub const MAX_MOVEMENTS: u32 = 200;

pub struct ListIngredientsHandler {
    inventory: Arc<dyn InventoryRepository>,
}

impl ListIngredientsHandler {
    pub fn new(inventory: Arc<dyn InventoryRepository>) -> Self {
        Self { inventory }
    }

    pub async fn handle(
        &self,
        actor: &AuthenticatedUser,
    ) -> Result<Vec<Ingredient>, InventoryError> {
        actor.require_any(&Role::STAFF)?;
        Ok(self.inventory.list_ingredients().await?)
    }
}

pub struct GetIngredientHandler {
    inventory: Arc<dyn InventoryRepository>,
}

impl GetIngredientHandler {
    pub fn new(inventory: Arc<dyn InventoryRepository>) -> Self {
        Self { inventory }
    }

    pub async fn handle(
        &self,
        id: IngredientId,
        actor: &AuthenticatedUser,
    ) -> Result<Ingredient, InventoryError> {
        actor.require_any(&Role::STAFF)?;
        self.inventory
            .find_ingredient(&id)
            .await?
            .ok_or(InventoryError::IngredientNotFound(id))
    }
}

pub struct ListMovementsHandler {
    inventory: Arc<dyn InventoryRepository>,
}

impl ListMovementsHandler {
    pub fn new(inventory: Arc<dyn InventoryRepository>) -> Self {
        Self { inventory }
    }

    pub async fn handle(
        &self,
        id: IngredientId,
        limit: u32,
        actor: &AuthenticatedUser,
    ) -> Result<Vec<StockMovement>, InventoryError> {
        actor.require_any(&Role::STAFF)?;
        self.inventory
            .find_ingredient(&id)
            .await?
            .ok_or(InventoryError::IngredientNotFound(id))?;
        Ok(self
            .inventory
            .list_movements(&id, limit.clamp(1, MAX_MOVEMENTS))
            .await?)
    }
}

pub struct ListAlertsHandler {
    inventory: Arc<dyn InventoryRepository>,
}

impl ListAlertsHandler {
    pub fn new(inventory: Arc<dyn InventoryRepository>) -> Self {
        Self { inventory }
    }

    pub async fn handle(
        &self,
        open_only: bool,
        actor: &AuthenticatedUser,
    ) -> Result<Vec<StockAlert>, InventoryError> {
        actor.require_any(&Role::STAFF)?;
        Ok(self.inventory.list_alerts(open_only).await?)
    }
}
