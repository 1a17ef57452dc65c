//! `/api/categories` and `/api/products`
//!
//! Reads are public so the customer menu can load without a token.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::handlers::menu::{
    CreateCategoryCommand, CreateCategoryHandler, CreateProductCommand, CreateProductHandler,
    GetProductHandler, ListCategoriesHandler, ListProductsHandler, SetRecipeCommand,
    SetRecipeHandler, UpdateProductCommand, UpdateProductHandler,
};
use crate::domain::foundation::{CategoryId, IngredientId, ProductId};
use crate::domain::inventory::Recipe;
use crate::domain::menu::{Category, Product, ProductChanges};
use crate::ports::ProductFilter;

use super::error::ApiError;
use super::middleware::RequireAuth;
use super::parse_id;
use super::response::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub available: Option<bool>,
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLineRequest {
    pub ingredient_id: IngredientId,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct SetRecipeRequest {
    pub ingredients: Vec<RecipeLineRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub available_only: bool,
}

#[derive(Clone)]
pub struct MenuHandlers {
    pub create_category: Arc<CreateCategoryHandler>,
    pub list_categories: Arc<ListCategoriesHandler>,
    pub create_product: Arc<CreateProductHandler>,
    pub update_product: Arc<UpdateProductHandler>,
    pub get_product: Arc<GetProductHandler>,
    pub list_products: Arc<ListProductsHandler>,
    pub set_recipe: Arc<SetRecipeHandler>,
}

/// GET /api/categories
pub async fn list_categories(
    State(handlers): State<MenuHandlers>,
) -> Result<ApiResponse<Vec<Category>>, ApiError> {
    Ok(ApiResponse::ok(handlers.list_categories.handle().await?))
}

/// POST /api/categories
pub async fn create_category(
    State(handlers): State<MenuHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<ApiResponse<Category>, ApiError> {
    let category = handlers
        .create_category
        .handle(
            CreateCategoryCommand {
                name: req.name,
                description: req.description,
            },
            &user,
        )
        .await?;
    Ok(ApiResponse::created(category))
}

/// GET /api/products?categoryId=&availableOnly=
pub async fn list_products(
    State(handlers): State<MenuHandlers>,
    Query(query): Query<ProductQuery>,
) -> Result<ApiResponse<Vec<Product>>, ApiError> {
    let products = handlers
        .list_products
        .handle(ProductFilter {
            category_id: query.category_id,
            available_only: query.available_only,
        })
        .await?;
    Ok(ApiResponse::ok(products))
}

/// GET /api/products/:id
pub async fn get_product(
    State(handlers): State<MenuHandlers>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Product>, ApiError> {
    let id: ProductId = parse_id(&id, "product id")?;
    Ok(ApiResponse::ok(handlers.get_product.handle(id).await?))
}

/// POST /api/products
pub async fn create_product(
    State(handlers): State<MenuHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateProductRequest>,
) -> Result<ApiResponse<Product>, ApiError> {
    let product = handlers
        .create_product
        .handle(
            CreateProductCommand {
                category_id: req.category_id,
                name: req.name,
                description: req.description,
                price: req.price,
            },
            &user,
        )
        .await?;
    Ok(ApiResponse::created(product))
}

/// PATCH /api/products/:id
pub async fn update_product(
    State(handlers): State<MenuHandlers>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<ApiResponse<Product>, ApiError> {
    let product_id: ProductId = parse_id(&id, "product id")?;
    let changes = ProductChanges {
        name: req.name,
        description: req.description,
        price: req.price,
        available: req.available,
        category_id: req.category_id,
    };
    let cmd = UpdateProductCommand {
        product_id,
        changes,
    };
    let product = handlers.update_product.handle(cmd, &user).await?;
    Ok(ApiResponse::ok(product))
}

/// PUT /api/products/:id/recipe
pub async fn set_recipe(
    State(handlers): State<MenuHandlers>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<SetRecipeRequest>,
) -> Result<ApiResponse<Recipe>, ApiError> {
    let product_id: ProductId = parse_id(&id, "product id")?;
    let lines = req
        .ingredients
        .into_iter()
        .map(|line| (line.ingredient_id, line.quantity))
        .collect();
    let recipe = handlers
        .set_recipe
        .handle(SetRecipeCommand { product_id, lines }, &user)
        .await?;
    Ok(ApiResponse::ok(recipe))
}

pub fn category_routes(handlers: MenuHandlers) -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .with_state(handlers)
}

pub fn product_routes(handlers: MenuHandlers) -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).patch(update_product))
        .route("/:id/recipe", put(set_recipe))
        .with_state(handlers)
}
