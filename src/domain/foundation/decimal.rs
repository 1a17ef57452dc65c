//! Bounds for decimal amounts, matching the NUMERIC columns they are
//! stored in.

use rust_decimal::Decimal;

use super::ValidationError;

/// Largest value and number of fractional digits a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalBounds {
    pub max: Decimal,
    pub scale: u32,
}

/// `NUMERIC(10, 2)`: prices, line prices and order totals.
pub const MONEY: DecimalBounds = DecimalBounds {
    // 9_999_999_999 * 10^-2
    max: Decimal::from_parts(1_410_065_407, 2, 0, false, 2),
    scale: 2,
};

/// `NUMERIC(12, 3)`: stock levels, movement and recipe quantities.
pub const STOCK: DecimalBounds = DecimalBounds {
    // 999_999_999_999 * 10^-3
    max: Decimal::from_parts(3_567_587_327, 232, 0, false, 3),
    scale: 3,
};

impl DecimalBounds {
    /// Rejects values above `max` or with more fractional digits than
    /// `scale`. Trailing zeros do not count.
    pub fn check(&self, field: &str, value: Decimal) -> Result<Decimal, ValidationError> {
        if value.normalize().scale() > self.scale {
            return Err(ValidationError::invalid_format(
                field,
                format!("at most {} decimal places", self.scale),
            ));
        }
        if value > self.max {
            return Err(ValidationError::invalid_format(
                field,
                format!("must not exceed {}", self.max),
            ));
        }
        Ok(value)
    }
}
