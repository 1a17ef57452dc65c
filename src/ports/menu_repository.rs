//! Menu repository port: categories, products and product recipes.

use async_trait::async_trait;

use crate::domain::foundation::{CategoryId, DomainError, ProductId};
use crate::domain::inventory::Recipe;
use crate::domain::menu::{Category, Product};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub available_only: bool,
}

#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// # Errors
    ///
    /// - `AlreadyExists` (detail `name`) for a duplicate category name
    async fn save_category(&self, category: &Category) -> Result<(), DomainError>;

    async fn find_category(&self, id: &CategoryId) -> Result<Option<Category>, DomainError>;

    /// Ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError>;

    async fn save_product(&self, product: &Product) -> Result<(), DomainError>;

    async fn update_product(&self, product: &Product) -> Result<(), DomainError>;

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, DomainError>;

    /// Products among `ids` that exist; missing ids are simply absent.
    async fn find_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, DomainError>;

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError>;

    /// Replaces the product's recipe.
    async fn save_recipe(&self, recipe: &Recipe) -> Result<(), DomainError>;

    /// Recipes for `ids`; products without a recipe are absent.
    async fn recipes_for(&self, ids: &[ProductId]) -> Result<Vec<Recipe>, DomainError>;
}
