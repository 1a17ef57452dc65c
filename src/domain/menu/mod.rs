//! Menu module - categories and products.

mod catalog;
mod errors;

pub use catalog::{Category, Product, ProductChanges};
pub use errors::MenuError;
