//! Tables and menu over the in-memory store.

use async_trait::async_trait;

use crate::domain::foundation::{CategoryId, DomainError, ErrorCode, ProductId, TableId};
use crate::domain::inventory::Recipe;
use crate::domain::menu::{Category, Product};
use crate::domain::table::{Table, TableStatus};
use crate::ports::{MenuRepository, ProductFilter, TableRepository};

use super::MemoryStore;

fn table_not_found(id: &TableId) -> DomainError {
    DomainError::new(ErrorCode::TableNotFound, format!("Table not found: {}", id))
}

fn table_busy(table: &Table, active_orders: i64) -> DomainError {
    DomainError::new(
        ErrorCode::TableBusy,
        format!("Table {} has {} active order(s)", table.number(), active_orders),
    )
    .with_detail("number", table.number().to_string())
    .with_detail("active_orders", active_orders.to_string())
}

#[async_trait]
impl TableRepository for MemoryStore {
    async fn save(&self, table: &Table) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let taken = state
            .tables
            .values()
            .any(|t| t.number() == table.number() && t.id() != table.id());
        if taken {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                format!("Table number {} is already in use", table.number()),
            )
            .with_detail("number", table.number().to_string()));
        }
        state.tables.insert(*table.id(), table.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TableId) -> Result<Option<Table>, DomainError> {
        Ok(self.state.lock().await.tables.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Table>, DomainError> {
        let state = self.state.lock().await;
        let mut tables: Vec<Table> = state.tables.values().cloned().collect();
        tables.sort_by_key(Table::number);
        Ok(tables)
    }

    async fn set_status(
        &self,
        id: &TableId,
        status: TableStatus,
        require_idle: bool,
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let active = state.active_orders_for_table(id);
        let mut table = state.tables.get(id).cloned().ok_or_else(|| table_not_found(id))?;
        if require_idle && active > 0 {
            return Err(table_busy(&table, active));
        }
        table
            .change_status(status, 0)
            .map_err(|err| DomainError::new(err.code(), err.to_string()))?;
        state.tables.insert(*id, table);
        Ok(())
    }

    async fn delete(&self, id: &TableId) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let active = state.active_orders_for_table(id);
        let table = state.tables.get(id).ok_or_else(|| table_not_found(id))?;
        if active > 0 {
            return Err(table_busy(table, active));
        }
        state.tables.remove(id);
        Ok(())
    }
}

#[async_trait]
impl MenuRepository for MemoryStore {
    async fn save_category(&self, category: &Category) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if state
            .categories
            .values()
            .any(|c| c.name.eq_ignore_ascii_case(&category.name) && c.id != category.id)
        {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                format!("Category '{}' already exists", category.name),
            )
            .with_detail("name", category.name.clone()));
        }
        state.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn find_category(&self, id: &CategoryId) -> Result<Option<Category>, DomainError> {
        Ok(self.state.lock().await.categories.get(id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let state = self.state.lock().await;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn save_product(&self, product: &Product) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.products.insert(*product.id(), product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        match state.products.get_mut(product.id()) {
            Some(stored) => {
                *stored = product.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::ProductNotFound,
                format!("Product not found: {}", product.id()),
            )),
        }
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self.state.lock().await.products.get(id).cloned())
    }

    async fn find_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, DomainError> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        let state = self.state.lock().await;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|p| filter.category_id.map_or(true, |c| *p.category_id() == c))
            .filter(|p| !filter.available_only || p.is_available())
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(products)
    }

    async fn save_recipe(&self, recipe: &Recipe) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.recipes.insert(recipe.product_id, recipe.clone());
        Ok(())
    }

    async fn recipes_for(&self, ids: &[ProductId]) -> Result<Vec<Recipe>, DomainError> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.recipes.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_table_number_is_rejected() {
        let store = MemoryStore::new();
        store
            .save(&Table::new(12, 4, "http://localhost").unwrap())
            .await
            .unwrap();

        let err = store
            .save(&Table::new(12, 2, "http://localhost").unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::AlreadyExists);
        assert_eq!(err.details.get("number").map(String::as_str), Some("12"));
    }

    #[tokio::test]
    async fn tables_list_by_number() {
        let store = MemoryStore::new();
        for number in [8, 2, 5] {
            store
                .save(&Table::new(number, 4, "http://localhost").unwrap())
                .await
                .unwrap();
        }

        let numbers: Vec<i32> = store.list().await.unwrap().iter().map(Table::number).collect();
        assert_eq!(numbers, vec![2, 5, 8]);
    }

    #[tokio::test]
    async fn category_names_are_unique_ignoring_case() {
        let store = MemoryStore::new();
        store
            .save_category(&Category::new("Drinks".to_string(), None).unwrap())
            .await
            .unwrap();

        let err = store
            .save_category(&Category::new("drinks".to_string(), None).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
    }
}
