//! Menu categories and products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CategoryId, ProductId, Timestamp, ValidationError, MONEY};
use crate::domain::order::OrderLine;

use super::MenuError;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

fn validate_name(name: String) -> Result<String, ValidationError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::empty_field("name"));
    }
    let len = name.chars().count();
    if len > MAX_NAME_LENGTH {
        return Err(ValidationError::out_of_range(
            "name",
            1,
            MAX_NAME_LENGTH as i64,
            len as i64,
        ));
    }
    Ok(name)
}

fn validate_description(description: Option<String>) -> Result<Option<String>, ValidationError> {
    let Some(description) = description.map(|d| d.trim().to_string()) else {
        return Ok(None);
    };
    if description.is_empty() {
        return Ok(None);
    }
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::out_of_range(
            "description",
            0,
            MAX_DESCRIPTION_LENGTH as i64,
            len as i64,
        ));
    }
    Ok(Some(description))
}

fn validate_price(price: Decimal) -> Result<Decimal, ValidationError> {
    if price <= Decimal::ZERO {
        return Err(ValidationError::invalid_format("price", "must be positive"));
    }
    MONEY.check("price", price)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

impl Category {
    pub fn new(name: String, description: Option<String>) -> Result<Self, MenuError> {
        Ok(Self {
            id: CategoryId::new(),
            name: validate_name(name)?,
            description: validate_description(description)?,
            created_at: Timestamp::now(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    category_id: CategoryId,
    name: String,
    description: Option<String>,
    price: Decimal,
    available: bool,
    created_at: Timestamp,
    updated_at: Timestamp,
}

/// Partial update; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub available: Option<bool>,
    pub category_id: Option<CategoryId>,
}

impl Product {
    pub fn new(
        category_id: CategoryId,
        name: String,
        description: Option<String>,
        price: Decimal,
    ) -> Result<Self, MenuError> {
        let now = Timestamp::now();
        Ok(Self {
            id: ProductId::new(),
            category_id,
            name: validate_name(name)?,
            description: validate_description(description)?,
            price: validate_price(price)?,
            available: true,
            created_at: now,
            updated_at: now,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ProductId,
        category_id: CategoryId,
        name: String,
        description: Option<String>,
        price: Decimal,
        available: bool,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            category_id,
            name,
            description,
            price,
            available,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn category_id(&self) -> &CategoryId {
        &self.category_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn apply(&mut self, changes: ProductChanges) -> Result<(), MenuError> {
        if let Some(name) = changes.name {
            self.name = validate_name(name)?;
        }
        if changes.description.is_some() {
            self.description = validate_description(changes.description)?;
        }
        if let Some(price) = changes.price {
            self.price = validate_price(price)?;
        }
        if let Some(available) = changes.available {
            self.available = available;
        }
        if let Some(category_id) = changes.category_id {
            self.category_id = category_id;
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Snapshot of this product as an order line at today's price.
    pub fn order_line(&self, quantity: i32, notes: Option<String>) -> OrderLine {
        OrderLine {
            product_id: self.id,
            product_name: self.name.clone(),
            unit_price: self.price,
            quantity,
            notes,
        }
    }
}
