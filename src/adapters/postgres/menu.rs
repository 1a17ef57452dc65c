//! PostgreSQL implementation of MenuRepository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    CategoryId, DomainError, ErrorCode, IngredientId, ProductId, Timestamp,
};
use crate::domain::inventory::{Recipe, RecipeLine};
use crate::domain::menu::{Category, Product};
use crate::ports::{MenuRepository, ProductFilter};

use super::{column, db_error, is_unique_violation};

const PRODUCT_COLUMNS: &str =
    "id, category_id, name, description, price, available, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresMenuRepository {
    pool: PgPool,
}

impl PostgresMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_category(row: &PgRow) -> Result<Category, DomainError> {
    let created_at: DateTime<Utc> = column(row, "created_at")?;
    Ok(Category {
        id: CategoryId::from_uuid(column(row, "id")?),
        name: column(row, "name")?,
        description: column(row, "description")?,
        created_at: Timestamp::from_datetime(created_at),
    })
}

fn row_to_product(row: &PgRow) -> Result<Product, DomainError> {
    let created_at: DateTime<Utc> = column(row, "created_at")?;
    let updated_at: DateTime<Utc> = column(row, "updated_at")?;
    Ok(Product::reconstitute(
        ProductId::from_uuid(column(row, "id")?),
        CategoryId::from_uuid(column(row, "category_id")?),
        column(row, "name")?,
        column(row, "description")?,
        column(row, "price")?,
        column(row, "available")?,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}

fn product_ids(ids: &[ProductId]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}

#[async_trait]
impl MenuRepository for PostgresMenuRepository {
    async fn save_category(&self, category: &Category) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO categories (id, name, description, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(category.id.as_uuid())
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(
                    ErrorCode::AlreadyExists,
                    format!("Category '{}' already exists", category.name),
                )
                .with_detail("name", category.name.clone())
            } else {
                DomainError::database("Failed to insert category", e)
            }
        })?;
        Ok(())
    }

    async fn find_category(&self, id: &CategoryId) -> Result<Option<Category>, DomainError> {
        let row =
            sqlx::query("SELECT id, name, description, created_at FROM categories WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to fetch category"))?;
        row.as_ref().map(row_to_category).transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let rows =
            sqlx::query("SELECT id, name, description, created_at FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("Failed to list categories"))?;
        rows.iter().map(row_to_category).collect()
    }

    async fn save_product(&self, product: &Product) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, name, description, price, available, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(product.id().as_uuid())
        .bind(product.category_id().as_uuid())
        .bind(product.name())
        .bind(product.description())
        .bind(product.price())
        .bind(product.is_available())
        .bind(product.created_at().as_datetime())
        .bind(product.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert product"))?;
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                category_id = $2,
                name = $3,
                description = $4,
                price = $5,
                available = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(product.id().as_uuid())
        .bind(product.category_id().as_uuid())
        .bind(product.name())
        .bind(product.description())
        .bind(product.price())
        .bind(product.is_available())
        .bind(product.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update product"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ProductNotFound,
                format!("Product not found: {}", product.id()),
            ));
        }
        Ok(())
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to fetch product"))?;
        row.as_ref().map(row_to_product).transpose()
    }

    async fn find_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM products WHERE id = ANY($1)",
            PRODUCT_COLUMNS
        ))
        .bind(product_ids(ids))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch products"))?;
        rows.iter().map(row_to_product).collect()
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM products
            WHERE ($1::uuid IS NULL OR category_id = $1)
              AND (NOT $2 OR available)
            ORDER BY name
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(filter.category_id.map(|id| *id.as_uuid()))
        .bind(filter.available_only)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list products"))?;
        rows.iter().map(row_to_product).collect()
    }

    async fn save_recipe(&self, recipe: &Recipe) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        sqlx::query("DELETE FROM recipe_lines WHERE product_id = $1")
            .bind(recipe.product_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to clear recipe"))?;

        for line in &recipe.lines {
            sqlx::query(
                "INSERT INTO recipe_lines (product_id, ingredient_id, quantity) VALUES ($1, $2, $3)",
            )
            .bind(recipe.product_id.as_uuid())
            .bind(line.ingredient_id.as_uuid())
            .bind(line.quantity)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to insert recipe line"))?;
        }

        tx.commit().await.map_err(db_error("Failed to commit recipe"))
    }

    async fn recipes_for(&self, ids: &[ProductId]) -> Result<Vec<Recipe>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, ingredient_id, quantity FROM recipe_lines
            WHERE product_id = ANY($1)
            ORDER BY product_id, ingredient_id
            "#,
        )
        .bind(product_ids(ids))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch recipes"))?;

        let mut grouped: BTreeMap<Uuid, Vec<RecipeLine>> = BTreeMap::new();
        for row in &rows {
            let product_id: Uuid = column(row, "product_id")?;
            let quantity: Decimal = column(row, "quantity")?;
            grouped.entry(product_id).or_default().push(RecipeLine {
                ingredient_id: IngredientId::from_uuid(column(row, "ingredient_id")?),
                quantity,
            });
        }
        Ok(grouped
            .into_iter()
            .map(|(product_id, lines)| Recipe {
                product_id: ProductId::from_uuid(product_id),
                lines,
            })
            .collect())
    }
}
