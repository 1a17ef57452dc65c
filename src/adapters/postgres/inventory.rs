//! PostgreSQL implementation of InventoryRepository.
//!
//! The stock helpers are shared with the order store, which deducts stock
//! inside its own status-change transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, IngredientId, OrderId, StockAlertId, StockMovementId, Timestamp,
};
use crate::domain::inventory::{
    evaluate_alert, AlertType, Ingredient, MovementType, StockAlert, StockMovement,
};
use crate::ports::{InventoryRepository, MovementOutcome, MovementRequest};

use super::{column, db_error, is_unique_violation, parse_column, user_id};

const INGREDIENT_COLUMNS: &str =
    "id, name, unit, current_stock, min_stock, created_at, updated_at";

const ALERT_COLUMNS: &str =
    "id, ingredient_id, ingredient_name, alert_type, current_stock, min_stock, created_at, resolved_at";

#[derive(Clone)]
pub struct PostgresInventoryRepository {
    pool: PgPool,
}

impl PostgresInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn ingredient_not_found(id: &IngredientId) -> DomainError {
    DomainError::new(
        ErrorCode::IngredientNotFound,
        format!("Ingredient not found: {}", id),
    )
}

fn row_to_ingredient(row: &PgRow) -> Result<Ingredient, DomainError> {
    let created_at: DateTime<Utc> = column(row, "created_at")?;
    let updated_at: DateTime<Utc> = column(row, "updated_at")?;
    Ok(Ingredient::reconstitute(
        IngredientId::from_uuid(column(row, "id")?),
        column(row, "name")?,
        column(row, "unit")?,
        column(row, "current_stock")?,
        column(row, "min_stock")?,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}

fn row_to_movement(row: &PgRow) -> Result<StockMovement, DomainError> {
    let movement_type: String = column(row, "movement_type")?;
    let order_id: Option<Uuid> = column(row, "order_id")?;
    let created_at: DateTime<Utc> = column(row, "created_at")?;
    Ok(StockMovement {
        id: StockMovementId::from_uuid(column(row, "id")?),
        ingredient_id: IngredientId::from_uuid(column(row, "ingredient_id")?),
        movement_type: parse_column::<MovementType>(&movement_type, "movement_type")?,
        quantity: column(row, "quantity")?,
        previous_stock: column(row, "previous_stock")?,
        resulting_stock: column(row, "resulting_stock")?,
        reason: column(row, "reason")?,
        order_id: order_id.map(OrderId::from_uuid),
        created_by: user_id(column(row, "created_by")?)?,
        created_at: Timestamp::from_datetime(created_at),
    })
}

fn row_to_alert(row: &PgRow) -> Result<StockAlert, DomainError> {
    let alert_type: String = column(row, "alert_type")?;
    let created_at: DateTime<Utc> = column(row, "created_at")?;
    let resolved_at: Option<DateTime<Utc>> = column(row, "resolved_at")?;
    Ok(StockAlert {
        id: StockAlertId::from_uuid(column(row, "id")?),
        ingredient_id: IngredientId::from_uuid(column(row, "ingredient_id")?),
        ingredient_name: column(row, "ingredient_name")?,
        alert_type: parse_column::<AlertType>(&alert_type, "alert_type")?,
        current_stock: column(row, "current_stock")?,
        min_stock: column(row, "min_stock")?,
        created_at: Timestamp::from_datetime(created_at),
        resolved_at: resolved_at.map(Timestamp::from_datetime),
    })
}

/// Reads the ingredient and holds its row lock until the transaction ends.
pub(super) async fn lock_ingredient(
    tx: &mut Transaction<'_, Postgres>,
    id: &IngredientId,
) -> Result<Option<Ingredient>, DomainError> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM ingredients WHERE id = $1 FOR UPDATE",
        INGREDIENT_COLUMNS
    ))
    .bind(id.as_uuid())
    .fetch_optional(&mut **tx)
    .await
    .map_err(db_error("Failed to lock ingredient"))?;
    row.as_ref().map(row_to_ingredient).transpose()
}

/// Writes the new level of a locked ingredient.
pub(super) async fn store_level(
    tx: &mut Transaction<'_, Postgres>,
    ingredient: &Ingredient,
) -> Result<(), DomainError> {
    sqlx::query("UPDATE ingredients SET current_stock = $2, updated_at = $3 WHERE id = $1")
        .bind(ingredient.id().as_uuid())
        .bind(ingredient.current_stock())
        .bind(ingredient.updated_at().as_datetime())
        .execute(&mut **tx)
        .await
        .map_err(db_error("Failed to update stock level"))?;
    Ok(())
}

/// Conditional decrement for order consumption. Fails with
/// `InsufficientStock` instead of driving the level negative.
pub(super) async fn deduct_stock(
    tx: &mut Transaction<'_, Postgres>,
    ingredient: &Ingredient,
    quantity: rust_decimal::Decimal,
) -> Result<(), DomainError> {
    let updated = sqlx::query(
        r#"
        UPDATE ingredients SET current_stock = current_stock - $2, updated_at = $3
        WHERE id = $1 AND current_stock >= $2
        "#,
    )
    .bind(ingredient.id().as_uuid())
    .bind(quantity)
    .bind(ingredient.updated_at().as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(db_error("Failed to deduct stock"))?;

    if updated.rows_affected() == 0 {
        return Err(DomainError::new(
            ErrorCode::InsufficientStock,
            format!("Not enough {} in stock", ingredient.name()),
        )
        .with_detail("ingredient", ingredient.name()));
    }
    Ok(())
}

pub(super) async fn insert_movement(
    tx: &mut Transaction<'_, Postgres>,
    movement: &StockMovement,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, ingredient_id, movement_type, quantity, previous_stock,
            resulting_stock, reason, order_id, created_by, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(movement.id.as_uuid())
    .bind(movement.ingredient_id.as_uuid())
    .bind(movement.movement_type.as_str())
    .bind(movement.quantity)
    .bind(movement.previous_stock)
    .bind(movement.resulting_stock)
    .bind(&movement.reason)
    .bind(movement.order_id.map(|id| *id.as_uuid()))
    .bind(movement.created_by.as_str())
    .bind(movement.created_at.as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(db_error("Failed to insert stock movement"))?;
    Ok(())
}

/// Raises the alert `ingredient` now calls for, unless one of that type is
/// still open. Returns the alert it stored.
pub(super) async fn raise_alert_after(
    tx: &mut Transaction<'_, Postgres>,
    movement_type: MovementType,
    ingredient: &Ingredient,
) -> Result<Option<StockAlert>, DomainError> {
    let open: Vec<(String,)> = sqlx::query_as(
        "SELECT alert_type FROM stock_alerts WHERE ingredient_id = $1 AND resolved_at IS NULL",
    )
    .bind(ingredient.id().as_uuid())
    .fetch_all(&mut **tx)
    .await
    .map_err(db_error("Failed to read open alerts"))?;
    let open = open
        .iter()
        .map(|(raw,)| parse_column::<AlertType>(raw, "alert_type"))
        .collect::<Result<Vec<_>, _>>()?;

    let Some(kind) = evaluate_alert(movement_type, ingredient, &open) else {
        return Ok(None);
    };
    let alert = StockAlert::raise(ingredient, kind, *ingredient.updated_at());
    sqlx::query(
        r#"
        INSERT INTO stock_alerts (
            id, ingredient_id, ingredient_name, alert_type, current_stock, min_stock, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(alert.id.as_uuid())
    .bind(alert.ingredient_id.as_uuid())
    .bind(&alert.ingredient_name)
    .bind(alert.alert_type.as_str())
    .bind(alert.current_stock)
    .bind(alert.min_stock)
    .bind(alert.created_at.as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(db_error("Failed to insert stock alert"))?;
    Ok(Some(alert))
}

#[async_trait]
impl InventoryRepository for PostgresInventoryRepository {
    async fn save_ingredient(&self, ingredient: &Ingredient) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO ingredients (id, name, unit, current_stock, min_stock, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(ingredient.id().as_uuid())
        .bind(ingredient.name())
        .bind(ingredient.unit())
        .bind(ingredient.current_stock())
        .bind(ingredient.min_stock())
        .bind(ingredient.created_at().as_datetime())
        .bind(ingredient.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(
                    ErrorCode::AlreadyExists,
                    format!("Ingredient '{}' already exists", ingredient.name()),
                )
                .with_detail("name", ingredient.name())
            } else {
                DomainError::database("Failed to insert ingredient", e)
            }
        })?;
        Ok(())
    }

    async fn find_ingredient(&self, id: &IngredientId) -> Result<Option<Ingredient>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM ingredients WHERE id = $1",
            INGREDIENT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch ingredient"))?;
        row.as_ref().map(row_to_ingredient).transpose()
    }

    async fn find_ingredients(&self, ids: &[IngredientId]) -> Result<Vec<Ingredient>, DomainError> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {} FROM ingredients WHERE id = ANY($1)",
            INGREDIENT_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch ingredients"))?;
        rows.iter().map(row_to_ingredient).collect()
    }

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM ingredients ORDER BY name",
            INGREDIENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list ingredients"))?;
        rows.iter().map(row_to_ingredient).collect()
    }

    async fn record_movement(
        &self,
        request: &MovementRequest,
    ) -> Result<MovementOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let mut ingredient = lock_ingredient(&mut tx, &request.ingredient_id)
            .await?
            .ok_or_else(|| ingredient_not_found(&request.ingredient_id))?;
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

        store_level(&mut tx, &ingredient).await?;
        insert_movement(&mut tx, &movement).await?;
        let alert = raise_alert_after(&mut tx, request.movement_type, &ingredient).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit stock movement"))?;
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
        let rows = sqlx::query(
            r#"
            SELECT id, ingredient_id, movement_type, quantity, previous_stock,
                   resulting_stock, reason, order_id, created_by, created_at
            FROM stock_movements
            WHERE ingredient_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(ingredient_id.as_uuid())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list stock movements"))?;
        rows.iter().map(row_to_movement).collect()
    }

    async fn list_alerts(&self, open_only: bool) -> Result<Vec<StockAlert>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM stock_alerts
            WHERE NOT $1 OR resolved_at IS NULL
            ORDER BY created_at DESC
            "#,
            ALERT_COLUMNS
        ))
        .bind(open_only)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list stock alerts"))?;
        rows.iter().map(row_to_alert).collect()
    }

    async fn resolve_alert(
        &self,
        id: &StockAlertId,
        at: Timestamp,
    ) -> Result<StockAlert, DomainError> {
        // COALESCE keeps the first resolution time on repeated calls.
        let row = sqlx::query(&format!(
            r#"
            UPDATE stock_alerts SET resolved_at = COALESCE(resolved_at, $2)
            WHERE id = $1
            RETURNING {}
            "#,
            ALERT_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(at.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to resolve stock alert"))?;

        match row {
            Some(row) => row_to_alert(&row),
            None => Err(DomainError::new(
                ErrorCode::AlertNotFound,
                format!("Alert not found: {}", id),
            )),
        }
    }
}

