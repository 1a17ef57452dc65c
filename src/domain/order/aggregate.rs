//! Order aggregate.
//!
//! An order is placed against one table and carries a snapshot of product
//! names and prices. Its total is fixed when it is placed and is never
//! recomputed; later price changes on the menu do not touch existing orders.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    OrderId, OrderItemId, ProductId, StateMachine, TableId, Timestamp, UserId, ValidationError,
    MONEY,
};

use super::{OrderError, OrderStatus};

pub const MAX_ITEMS_PER_ORDER: usize = 50;
pub const MAX_ITEM_QUANTITY: i32 = 99;
pub const MAX_NOTES_LENGTH: usize = 500;

/// One requested line, priced from the current menu.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_price: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Transfer => "TRANSFER",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CASH" => Ok(PaymentMethod::Cash),
            "CARD" => Ok(PaymentMethod::Card),
            "TRANSFER" => Ok(PaymentMethod::Transfer),
            other => Err(ValidationError::invalid_format(
                "payment_method",
                format!("unknown payment method '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub method: PaymentMethod,
    pub received_by: UserId,
    pub paid_at: Timestamp,
}

/// Order aggregate.
///
/// # Invariants
///
/// - 1..=50 items, each with quantity 1..=99
/// - `total` equals the sum of line prices at placement, and every price
///   fits [`MONEY`]
/// - status only moves along [`OrderStatus`] transitions
/// - payment is recorded at most once, and only after delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    table_id: TableId,
    table_number: i32,
    items: Vec<OrderItem>,
    status: OrderStatus,
    total: Decimal,
    notes: Option<String>,
    created_by: UserId,
    payment: Option<Payment>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Order {
    /// Places a new PENDING order.
    pub fn place(
        table_id: TableId,
        table_number: i32,
        lines: Vec<OrderLine>,
        notes: Option<String>,
        created_by: UserId,
    ) -> Result<Self, OrderError> {
        if lines.is_empty() {
            return Err(ValidationError::empty_field("items").into());
        }
        if lines.len() > MAX_ITEMS_PER_ORDER {
            return Err(ValidationError::out_of_range(
                "items",
                1,
                MAX_ITEMS_PER_ORDER as i64,
                lines.len() as i64,
            )
            .into());
        }
        let notes = normalize_notes("notes", notes)?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            if !(1..=MAX_ITEM_QUANTITY).contains(&line.quantity) {
                return Err(ValidationError::out_of_range(
                    "quantity",
                    1,
                    MAX_ITEM_QUANTITY as i64,
                    line.quantity as i64,
                )
                .into());
            }
            let unit_price = MONEY.check("unit_price", line.unit_price)?;
            let line_price = unit_price
                .checked_mul(Decimal::from(line.quantity))
                .ok_or_else(|| too_large("line_price"))?;
            items.push(OrderItem {
                id: OrderItemId::new(),
                product_id: line.product_id,
                product_name: line.product_name,
                quantity: line.quantity,
                unit_price,
                line_price: MONEY.check("line_price", line_price)?,
                notes: normalize_notes("item_notes", line.notes)?,
            });
        }
        let total = items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line_price))
            .ok_or_else(|| too_large("total"))?;
        let total = MONEY.check("total", total)?;

        let now = Timestamp::now();
        Ok(Self {
            id: OrderId::new(),
            table_id,
            table_number,
            items,
            status: OrderStatus::Pending,
            total,
            notes,
            created_by,
            payment: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute an order from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: OrderId,
        table_id: TableId,
        table_number: i32,
        items: Vec<OrderItem>,
        status: OrderStatus,
        total: Decimal,
        notes: Option<String>,
        created_by: UserId,
        payment: Option<Payment>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            table_id,
            table_number,
            items,
            status,
            total,
            notes,
            created_by,
            payment,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn table_id(&self) -> &TableId {
        &self.table_id
    }

    pub fn table_number(&self) -> i32 {
        self.table_number
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }

    pub fn payment(&self) -> Option<&Payment> {
        self.payment.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Checks that `target` is reachable from the current status.
    pub fn check_transition(&self, target: OrderStatus) -> Result<(), OrderError> {
        self.status
            .transition_to(target)
            .map(|_| ())
            .map_err(|err| OrderError::InvalidTransition {
                from: err.from,
                to: err.to,
            })
    }

    /// Moves to `target` after a successful store write.
    pub fn apply_transition(
        &mut self,
        target: OrderStatus,
        at: Timestamp,
    ) -> Result<(), OrderError> {
        self.check_transition(target)?;
        self.status = target;
        self.updated_at = at;
        Ok(())
    }

    /// Checks that the order can take a payment right now.
    pub fn check_payable(&self) -> Result<(), OrderError> {
        if self.payment.is_some() {
            return Err(OrderError::AlreadyPaid(self.id));
        }
        if self.status != OrderStatus::Delivered {
            return Err(OrderError::NotPayable(self.status));
        }
        Ok(())
    }

    pub fn record_payment(&mut self, payment: Payment) -> Result<(), OrderError> {
        self.check_payable()?;
        self.updated_at = payment.paid_at;
        self.payment = Some(payment);
        Ok(())
    }

    /// Units ordered per product, summed across lines.
    pub fn quantities_by_product(&self) -> Vec<(ProductId, i32)> {
        let mut totals: Vec<(ProductId, i32)> = Vec::new();
        for item in &self.items {
            match totals.iter_mut().find(|(id, _)| *id == item.product_id) {
                Some((_, qty)) => *qty += item.quantity,
                None => totals.push((item.product_id, item.quantity)),
            }
        }
        totals
    }
}

fn too_large(field: &str) -> ValidationError {
    ValidationError::invalid_format(field, format!("must not exceed {}", MONEY.max))
}

fn normalize_notes(field: &str, notes: Option<String>) -> Result<Option<String>, ValidationError> {
    let Some(notes) = notes else {
        return Ok(None);
    };
    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_NOTES_LENGTH {
        return Err(ValidationError::out_of_range(
            field,
            0,
            MAX_NOTES_LENGTH as i64,
            trimmed.chars().count() as i64,
        ));
    }
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    fn money(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn line(name: &str, price: Decimal, quantity: i32) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(),
            product_name: name.to_string(),
            unit_price: price,
            quantity,
            notes: None,
        }
    }

    fn waiter() -> UserId {
        UserId::new("waiter-1").unwrap()
    }

    fn placed() -> Order {
        Order::place(
            TableId::new(),
            3,
            vec![line("Burger", money("10.00"), 2), line("Cola", money("2.50"), 1)],
            None,
            waiter(),
        )
        .unwrap()
    }

    #[test]
    fn place_starts_pending_with_fixed_total() {
        let order = placed();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total(), money("22.50"));
        assert_eq!(order.items()[0].line_price, money("20.00"));
        assert_eq!(order.table_number(), 3);
    }

    #[test]
    fn place_rejects_empty_order() {
        let result = Order::place(TableId::new(), 1, vec![], None, waiter());
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[test]
    fn place_rejects_zero_quantity() {
        let result = Order::place(
            TableId::new(),
            1,
            vec![line("Soup", money("4.00"), 0)],
            None,
            waiter(),
        );
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[test]
    fn totals_beyond_the_money_column_are_rejected() {
        let priciest = money("99999999.99");
        let single = vec![line("Caviar", priciest, 1)];
        let order = Order::place(TableId::new(), 1, single, None, waiter()).unwrap();
        assert_eq!(order.total(), priciest);

        let cases = vec![
            vec![line("Caviar", priciest, 2)],
            vec![line("Caviar", priciest, 1), line("Bread", money("0.01"), 1)],
            vec![line("Overflow", Decimal::MAX, 99)],
        ];
        for lines in cases {
            let result = Order::place(TableId::new(), 1, lines, None, waiter());
            assert!(matches!(result, Err(OrderError::Validation(_))), "{:?}", result);
        }
    }

    #[test]
    fn sub_cent_prices_are_rejected() {
        let result = Order::place(
            TableId::new(),
            1,
            vec![line("Tea", money("2.505"), 1)],
            None,
            waiter(),
        );
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[test]
    fn blank_notes_are_dropped() {
        let order = Order::place(
            TableId::new(),
            1,
            vec![line("Soup", money("4.00"), 1)],
            Some("   ".to_string()),
            waiter(),
        )
        .unwrap();
        assert_eq!(order.notes(), None);
    }

    #[test]
    fn transition_follows_state_machine() {
        let mut order = placed();
        order
            .apply_transition(OrderStatus::Confirmed, Timestamp::now())
            .unwrap();
        assert_eq!(order.status(), OrderStatus::Confirmed);

        let err = order.check_transition(OrderStatus::Delivered).unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Confirmed,
                to: OrderStatus::Delivered
            }
        ));
    }

    #[test]
    fn same_status_is_not_a_transition() {
        let order = placed();
        assert!(order.check_transition(OrderStatus::Pending).is_err());
    }

    #[test]
    fn payment_requires_delivery_and_happens_once() {
        let mut order = placed();
        let payment = Payment {
            method: PaymentMethod::Card,
            received_by: waiter(),
            paid_at: Timestamp::now(),
        };
        assert!(matches!(
            order.check_payable(),
            Err(OrderError::NotPayable(OrderStatus::Pending))
        ));

        for next in [
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Delivered,
        ] {
            order.apply_transition(next, Timestamp::now()).unwrap();
        }
        order.record_payment(payment.clone()).unwrap();
        assert!(matches!(
            order.record_payment(payment),
            Err(OrderError::AlreadyPaid(_))
        ));
    }

    #[test]
    fn quantities_are_summed_per_product() {
        let burger = line("Burger", money("10.00"), 2);
        let mut second = burger.clone();
        second.quantity = 3;
        let order = Order::place(TableId::new(), 1, vec![burger.clone(), second], None, waiter())
            .unwrap();

        assert_eq!(order.quantities_by_product(), vec![(burger.product_id, 5)]);
    }

    #[test]
    fn payment_method_parses_case_insensitively() {
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }
}
