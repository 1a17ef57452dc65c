//! Menu handlers: categories, products and their recipes.
//!
//! Writes are limited to admins and managers and pass the daily-close gate.
//! Anyone signed in may read the menu.

mod categories;
mod products;
mod set_recipe;

pub use categories::{CreateCategoryCommand, CreateCategoryHandler, ListCategoriesHandler};
pub use products::{
    CreateProductCommand, CreateProductHandler, GetProductHandler, ListProductsHandler,
    UpdateProductCommand, UpdateProductHandler,
};
pub use set_recipe::{SetRecipeCommand, SetRecipeHandler};

use crate::domain::foundation::Role;

const MENU_ADMINS: &[Role] = &[Role::Admin, Role::Manager];
