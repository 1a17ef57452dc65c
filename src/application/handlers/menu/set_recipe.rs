//! SetRecipeHandler - replaces the ingredients a product consumes.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::LockGuard;
use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::{AuthenticatedUser, IngredientId, ProductId, ValidationError};
use crate::domain::inventory::{InventoryError, Recipe, RecipeLine};
use crate::domain::menu::MenuError;
use crate::ports::{InventoryRepository, MenuRepository};

use super::MENU_ADMINS;

#[derive(Debug, Clone)]
pub struct SetRecipeCommand {
    pub product_id: ProductId,
    /// Quantity of each ingredient per unit of product.
    pub lines: Vec<(IngredientId, Decimal)>,
}

pub struct SetRecipeHandler {
    menu: Arc<dyn MenuRepository>,
    inventory: Arc<dyn InventoryRepository>,
    lock: Arc<LockGuard>,
}

impl SetRecipeHandler {
    pub fn new(
        menu: Arc<dyn MenuRepository>,
        inventory: Arc<dyn InventoryRepository>,
        lock: Arc<LockGuard>,
    ) -> Self {
        Self {
            menu,
            inventory,
            lock,
        }
    }

    pub async fn handle(
        &self,
        cmd: SetRecipeCommand,
        actor: &AuthenticatedUser,
    ) -> Result<Recipe, MenuError> {
        actor.require_any(MENU_ADMINS)?;
        self.lock.check(LockCategory::MenuChange, actor).await?;

        self.menu
            .find_product(&cmd.product_id)
            .await?
            .ok_or(MenuError::ProductNotFound(cmd.product_id))?;

        let ids: Vec<IngredientId> = cmd.lines.iter().map(|(id, _)| *id).collect();
        let known = self.inventory.find_ingredients(&ids).await?;
        if let Some(missing) = ids.iter().find(|id| !known.iter().any(|i| i.id() == *id)) {
            return Err(ValidationError::invalid_format(
                "ingredients",
                format!("unknown ingredient {}", missing),
            )
            .into());
        }

        let lines = cmd
            .lines
            .into_iter()
            .map(|(ingredient_id, quantity)| RecipeLine {
                ingredient_id,
                quantity,
            })
            .collect();
        let recipe = Recipe::new(cmd.product_id, lines).map_err(|err| match err {
            InventoryError::Validation(v) => MenuError::Validation(v),
            other => MenuError::Infrastructure(other.to_string()),
        })?;
        self.menu.save_recipe(&recipe).await?;

        tracing::info!(product_id = %cmd.product_id, lines = recipe.lines.len(), "Recipe saved");
        Ok(recipe)
    }
}
