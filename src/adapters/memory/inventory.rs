//! InventoryRepository over the in-memory store.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, IngredientId, StockAlertId, Timestamp};
use crate::domain::inventory::{Ingredient, StockAlert, StockMovement};
use crate::ports::{InventoryRepository, MovementOutcome, MovementRequest};

use super::MemoryStore;

#[async_trait]
impl InventoryRepository for MemoryStore {
    async fn save_ingredient(&self, ingredient: &Ingredient) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if state
            .ingredients
            .values()
            .any(|i| i.name().eq_ignore_ascii_case(ingredient.name()) && i.id() != ingredient.id())
        {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                format!("Ingredient '{}' already exists", ingredient.name()),
            )
            .with_detail("name", ingredient.name()));
        }
        state.ingredients.insert(*ingredient.id(), ingredient.clone());
        Ok(())
    }

    async fn find_ingredient(&self, id: &IngredientId) -> Result<Option<Ingredient>, DomainError> {
        Ok(self.state.lock().await.ingredients.get(id).cloned())
    }

    async fn find_ingredients(&self, ids: &[IngredientId]) -> Result<Vec<Ingredient>, DomainError> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.ingredients.get(id).cloned())
            .collect())
    }

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, DomainError> {
        let state = self.state.lock().await;
        let mut ingredients: Vec<Ingredient> = state.ingredients.values().cloned().collect();
        ingredients.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(ingredients)
    }

    async fn record_movement(
        &self,
        request: &MovementRequest,
    ) -> Result<MovementOutcome, DomainError> {
        let mut state = self.state.lock().await;
        let mut ingredient = state
            .ingredients
            .get(&request.ingredient_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::IngredientNotFound,
                    format!("Ingredient not found: {}", request.ingredient_id),
                )
            })?;

        let change =
            ingredient.apply_movement(request.movement_type, request.quantity, request.at)?;
        let movement = StockMovement::record(
            request.ingredient_id,
            request.movement_type,
            request.quantity,
            change,
            request.reason.clone(),
            request.created_by.clone(),
            request.at,
        );
        let alert = state.alert_after(request.movement_type, &ingredient, &[]);

        state.ingredients.insert(request.ingredient_id, ingredient.clone());
        state.movements.push(movement.clone());
        if let Some(alert) = &alert {
            state.alerts.push(alert.clone());
        }
        Ok(MovementOutcome {
            ingredient,
            movement,
            alert,
        })
    }

    async fn list_movements(
        &self,
        ingredient_id: &IngredientId,
        limit: u32,
    ) -> Result<Vec<StockMovement>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .movements
            .iter()
            .rev()
            .filter(|m| m.ingredient_id == *ingredient_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_alerts(&self, open_only: bool) -> Result<Vec<StockAlert>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .alerts
            .iter()
            .rev()
            .filter(|a| !open_only || a.is_open())
            .cloned()
            .collect())
    }

    async fn resolve_alert(
        &self,
        id: &StockAlertId,
        at: Timestamp,
    ) -> Result<StockAlert, DomainError> {
        let mut state = self.state.lock().await;
        let alert = state
            .alerts
            .iter_mut()
            .find(|a| a.id == *id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::AlertNotFound, format!("Alert not found: {}", id))
            })?;
        alert.resolve(at);
        Ok(alert.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::inventory::{AlertType, MovementType};
    use rust_decimal::Decimal;

    fn request(ingredient: &Ingredient, kind: MovementType, quantity: i64) -> MovementRequest {
        MovementRequest {
            ingredient_id: *ingredient.id(),
            movement_type: kind,
            quantity: Decimal::from(quantity),
            reason: None,
            created_by: UserId::new("kitchen-1").unwrap(),
            at: Timestamp::now(),
        }
    }

    async fn tomato(store: &MemoryStore) -> Ingredient {
        let tomato = Ingredient::new("Tomato", "kg", Decimal::from(5), Decimal::from(10)).unwrap();
        store.save_ingredient(&tomato).await.unwrap();
        tomato
    }

    #[tokio::test]
    async fn out_below_minimum_raises_low_stock_once() {
        let store = MemoryStore::new();
        let tomato = tomato(&store).await;

        let first = store
            .record_movement(&request(&tomato, MovementType::Out, 2))
            .await
            .unwrap();
        assert_eq!(first.ingredient.current_stock(), Decimal::from(3));
        assert_eq!(first.alert.map(|a| a.alert_type), Some(AlertType::LowStock));

        let second = store
            .record_movement(&request(&tomato, MovementType::Out, 1))
            .await
            .unwrap();
        assert!(second.alert.is_none());
    }

    #[tokio::test]
    async fn rejected_movement_changes_nothing() {
        let store = MemoryStore::new();
        let tomato = tomato(&store).await;

        let err = store
            .record_movement(&request(&tomato, MovementType::Waste, 6))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        let stored = store.find_ingredient(tomato.id()).await.unwrap().unwrap();
        assert_eq!(stored.current_stock(), Decimal::from(5));
        assert_eq!(store.movement_count().await, 0);
    }

    #[tokio::test]
    async fn resolving_frees_the_alert_type_again() {
        let store = MemoryStore::new();
        let tomato = tomato(&store).await;
        let raised = store
            .record_movement(&request(&tomato, MovementType::Out, 1))
            .await
            .unwrap()
            .alert
            .unwrap();

        store.resolve_alert(&raised.id, Timestamp::now()).await.unwrap();
        let again = store
            .record_movement(&request(&tomato, MovementType::Out, 1))
            .await
            .unwrap();

        assert!(again.alert.is_some());
        assert_eq!(store.list_alerts(true).await.unwrap().len(), 1);
    }
}
