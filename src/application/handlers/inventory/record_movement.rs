//! RecordMovementHandler - manual stock entries (deliveries, waste, counts).

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::handlers::events::EventBatch;
use crate::application::LockGuard;
use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::{AuthenticatedUser, ErrorCode, IngredientId, Timestamp};
use crate::domain::inventory::{InventoryError, MovementType, StockAlertRaised};
use crate::ports::{EventPublisher, InventoryRepository, MovementOutcome, MovementRequest};

use super::STOCK_KEEPERS;

#[derive(Debug, Clone)]
pub struct RecordMovementCommand {
    pub ingredient_id: IngredientId,
    pub movement_type: MovementType,
    /// For ADJUSTMENT this is the counted stock, not a delta.
    pub quantity: Decimal,
    pub reason: Option<String>,
}

pub struct RecordMovementHandler {
    inventory: Arc<dyn InventoryRepository>,
    lock: Arc<LockGuard>,
    publisher: Arc<dyn EventPublisher>,
}

impl RecordMovementHandler {
    pub fn new(
        inventory: Arc<dyn InventoryRepository>,
        lock: Arc<LockGuard>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            inventory,
            lock,
            publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordMovementCommand,
        actor: &AuthenticatedUser,
    ) -> Result<MovementOutcome, InventoryError> {
        actor.require_any(STOCK_KEEPERS)?;
        self.lock.check(LockCategory::InventoryChange, actor).await?;

        let request = MovementRequest {
            ingredient_id: cmd.ingredient_id,
            movement_type: cmd.movement_type,
            quantity: cmd.quantity,
            reason: cmd.reason,
            created_by: actor.id.clone(),
            at: Timestamp::now(),
        };
        let outcome = self
            .inventory
            .record_movement(&request)
            .await
            .map_err(|err| match err.code {
                ErrorCode::IngredientNotFound => {
                    InventoryError::IngredientNotFound(cmd.ingredient_id)
                }
                _ => err.into(),
            })?;

        tracing::info!(
            ingredient = outcome.ingredient.name(),
            movement = %cmd.movement_type,
            quantity = %cmd.quantity,
            previous = %outcome.movement.previous_stock,
            resulting = %outcome.movement.resulting_stock,
            user_id = %actor.id,
            "Stock movement recorded"
        );

        if let Some(alert) = &outcome.alert {
            tracing::warn!(
                ingredient = %alert.ingredient_name,
                alert_type = alert.alert_type.as_str(),
                "Stock alert raised"
            );
            let mut batch = EventBatch::new(actor);
            batch.push(&StockAlertRaised::from(alert));
            batch.publish(self.publisher.as_ref()).await;
        }
        Ok(outcome)
    }
}
