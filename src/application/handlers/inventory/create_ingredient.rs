use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::LockGuard;
use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::{AuthenticatedUser, Role};
use crate::domain::inventory::{Ingredient, InventoryError};
use crate::ports::InventoryRepository;

#[derive(Debug, Clone)]
pub struct CreateIngredientCommand {
    pub name: String,
    pub unit: String,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
}

pub struct CreateIngredientHandler {
    inventory: Arc<dyn InventoryRepository>,
    lock: Arc<LockGuard>,
}

impl CreateIngredientHandler {
    pub fn new(inventory: Arc<dyn InventoryRepository>, lock: Arc<LockGuard>) -> Self {
        Self { inventory, lock }
    }

    pub async fn handle(
        &self,
        cmd: CreateIngredientCommand,
        actor: &AuthenticatedUser,
    ) -> Result<Ingredient, InventoryError> {
        actor.require_any(&[Role::Admin, Role::Manager])?;
        self.lock.check(LockCategory::InventoryChange, actor).await?;

        let ingredient = Ingredient::new(cmd.name, cmd.unit, cmd.current_stock, cmd.min_stock)?;
        self.inventory.save_ingredient(&ingredient).await?;

        tracing::info!(
            ingredient_id = %ingredient.id(),
            name = ingredient.name(),
            stock = %ingredient.current_stock(),
            "Ingredient created"
        );
        Ok(ingredient)
    }
}
