use std::sync::Arc;

use crate::application::LockGuard;
use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::{AuthenticatedUser, ErrorCode, StockAlertId, Timestamp};
use crate::domain::inventory::{InventoryError, StockAlert};
use crate::ports::InventoryRepository;

use super::STOCK_KEEPERS;

/// Marks a stock alert as handled so the same condition can alert again.
pub struct ResolveAlertHandler {
    inventory: Arc<dyn InventoryRepository>,
    lock: Arc<LockGuard>,
}

impl ResolveAlertHandler {
    pub fn new(inventory: Arc<dyn InventoryRepository>, lock: Arc<LockGuard>) -> Self {
        Self { inventory, lock }
    }

    pub async fn handle(
        &self,
        alert_id: StockAlertId,
        actor: &AuthenticatedUser,
    ) -> Result<StockAlert, InventoryError> {
        actor.require_any(STOCK_KEEPERS)?;
        self.lock.check(LockCategory::InventoryChange, actor).await?;

        let alert = self
            .inventory
            .resolve_alert(&alert_id, Timestamp::now())
            .await
            .map_err(|err| match err.code {
                ErrorCode::AlertNotFound => InventoryError::AlertNotFound(alert_id),
                _ => err.into(),
            })?;
        tracing::info!(
            alert_id = %alert_id,
            ingredient = %alert.ingredient_name,
            "Stock alert resolved"
        );
        Ok(alert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{user, Fixture};
    use crate::domain::foundation::{Role, UserId};
    use crate::domain::inventory::MovementType;
    use crate::ports::MovementRequest;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn resolved_alert_leaves_open_list() {
        let fx = Fixture::new();
        let milk = fx.ingredient("Milk", 3, 2).await;
        let outcome = fx
            .store
            .record_movement(&MovementRequest {
                ingredient_id: *milk.id(),
                movement_type: MovementType::Out,
                quantity: Decimal::from(2),
                reason: None,
                created_by: UserId::new("kitchen-1").unwrap(),
                at: Timestamp::now(),
            })
            .await
            .unwrap();
        let alert = outcome.alert.unwrap();

        let resolved = ResolveAlertHandler::new(fx.store.clone(), fx.lock.clone())
            .handle(alert.id, &user(Role::Kitchen))
            .await
            .unwrap();

        assert!(!resolved.is_open());
        assert!(fx.store.list_alerts(true).await.unwrap().is_empty());
        assert_eq!(fx.store.list_alerts(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_alert_is_not_found() {
        let fx = Fixture::new();
        let err = ResolveAlertHandler::new(fx.store.clone(), fx.lock.clone())
            .handle(StockAlertId::new(), &user(Role::Manager))
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::AlertNotFound(_)));
    }
}
