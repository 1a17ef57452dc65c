//! Product handlers.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::LockGuard;
use crate::domain::daily_close::LockCategory;
use crate::domain::foundation::{AuthenticatedUser, CategoryId, ProductId};
use crate::domain::menu::{MenuError, Product, ProductChanges};
use crate::ports::{MenuRepository, ProductFilter};

use super::MENU_ADMINS;

#[derive(Debug, Clone)]
pub struct CreateProductCommand {
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

#[derive(Debug, Clone)]
pub struct UpdateProductCommand {
    pub product_id: ProductId,
    pub changes: ProductChanges,
}

pub struct CreateProductHandler {
    menu: Arc<dyn MenuRepository>,
    lock: Arc<LockGuard>,
}

impl CreateProductHandler {
    pub fn new(menu: Arc<dyn MenuRepository>, lock: Arc<LockGuard>) -> Self {
        Self { menu, lock }
    }

    pub async fn handle(
        &self,
        cmd: CreateProductCommand,
        actor: &AuthenticatedUser,
    ) -> Result<Product, MenuError> {
        actor.require_any(MENU_ADMINS)?;
        self.lock.check(LockCategory::MenuChange, actor).await?;

        self.menu
            .find_category(&cmd.category_id)
            .await?
            .ok_or(MenuError::CategoryNotFound(cmd.category_id))?;
        let product = Product::new(cmd.category_id, cmd.name, cmd.description, cmd.price)?;
        self.menu.save_product(&product).await?;

        tracing::info!(product_id = %product.id(), name = product.name(), "Product created");
        Ok(product)
    }
}

/// Price, availability and the other editable fields.
pub struct UpdateProductHandler {
    menu: Arc<dyn MenuRepository>,
    lock: Arc<LockGuard>,
}

impl UpdateProductHandler {
    pub fn new(menu: Arc<dyn MenuRepository>, lock: Arc<LockGuard>) -> Self {
        Self { menu, lock }
    }

    pub async fn handle(
        &self,
        cmd: UpdateProductCommand,
        actor: &AuthenticatedUser,
    ) -> Result<Product, MenuError> {
        actor.require_any(MENU_ADMINS)?;
        self.lock.check(LockCategory::MenuChange, actor).await?;

        let mut product = self
            .menu
            .find_product(&cmd.product_id)
            .await?
            .ok_or(MenuError::ProductNotFound(cmd.product_id))?;
        if let Some(category_id) = cmd.changes.category_id {
            self.menu
                .find_category(&category_id)
                .await?
                .ok_or(MenuError::CategoryNotFound(category_id))?;
        }
        product.apply(cmd.changes)?;
        self.menu.update_product(&product).await?;

        tracing::info!(
            product_id = %product.id(),
            price = %product.price(),
            available = product.is_available(),
            "Product updated"
        );
        Ok(product)
    }
}

pub struct GetProductHandler {
    menu: Arc<dyn MenuRepository>,
}

impl GetProductHandler {
    pub fn new(menu: Arc<dyn MenuRepository>) -> Self {
        Self { menu }
    }

    pub async fn handle(&self, id: ProductId) -> Result<Product, MenuError> {
        self.menu
            .find_product(&id)
            .await?
            .ok_or(MenuError::ProductNotFound(id))
    }
}

pub struct ListProductsHandler {
    menu: Arc<dyn MenuRepository>,
}

impl ListProductsHandler {
    pub fn new(menu: Arc<dyn MenuRepository>) -> Self {
        Self { menu }
    }

    pub async fn handle(&self, filter: ProductFilter) -> Result<Vec<Product>, MenuError> {
        Ok(self.menu.list_products(&filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{user, Fixture};
    use crate::domain::foundation::Role;
    use crate::domain::menu::Category;

    async fn category(fx: &Fixture) -> Category {
        let category = Category::new("Mains".to_string(), None).unwrap();
        fx.store.save_category(&category).await.unwrap();
        category
    }

    #[tokio::test]
    async fn product_needs_an_existing_category() {
        let fx = Fixture::new();

        let err = CreateProductHandler::new(fx.store.clone(), fx.lock.clone())
            .handle(
                CreateProductCommand {
                    category_id: CategoryId::new(),
                    name: "Steak".to_string(),
                    description: None,
                    price: Decimal::from(20),
                },
                &user(Role::Manager),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, MenuError::CategoryNotFound(_)));
    }

    #[tokio::test]
    async fn unavailable_products_drop_out_of_filtered_list() {
        let fx = Fixture::new();
        let mains = category(&fx).await;
        let create = CreateProductHandler::new(fx.store.clone(), fx.lock.clone());
        let steak = create
            .handle(
                CreateProductCommand {
                    category_id: mains.id,
                    name: "Steak".to_string(),
                    description: None,
                    price: Decimal::from(20),
                },
                &user(Role::Manager),
            )
            .await
            .unwrap();
        create
            .handle(
                CreateProductCommand {
                    category_id: mains.id,
                    name: "Fish".to_string(),
                    description: None,
                    price: Decimal::from(18),
                },
                &user(Role::Manager),
            )
            .await
            .unwrap();

        let updated = UpdateProductHandler::new(fx.store.clone(), fx.lock.clone())
            .handle(
                UpdateProductCommand {
                    product_id: *steak.id(),
                    changes: ProductChanges {
                        available: Some(false),
                        price: Some(Decimal::from(22)),
                        ..Default::default()
                    },
                },
                &user(Role::Admin),
            )
            .await
            .unwrap();
        assert_eq!(updated.price(), Decimal::from(22));

        let list = ListProductsHandler::new(fx.store.clone());
        let all = list
            .handle(ProductFilter {
                category_id: Some(mains.id),
                available_only: false,
            })
            .await
            .unwrap();
        let available = list
            .handle(ProductFilter {
                category_id: None,
                available_only: true,
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name(), "Fish");
    }

    #[tokio::test]
    async fn cashier_cannot_edit_menu() {
        let fx = Fixture::new();
        let err = UpdateProductHandler::new(fx.store.clone(), fx.lock.clone())
            .handle(
                UpdateProductCommand {
                    product_id: ProductId::new(),
                    changes: ProductChanges::default(),
                },
                &user(Role::Cashier),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MenuError::Forbidden(_)));
    }
}
