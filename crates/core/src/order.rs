//! Orders and order totals.
//!
//! [`assemble_total`] is the gate between a priced cart and a persisted order:
//! it refuses to produce totals for an address outside every delivery zone.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{OrderId, OrderStatus, ProductId};

/// One line of an order.
///
/// Stored inside `orders.items` (JSONB), so the serialized shape is part of
/// the persisted contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product the line was priced from. For pizzas, the first selected flavor.
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    /// Flavor names for multi-flavor pizza lines.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flavors: Vec<String>,
}

impl OrderItem {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Charged amounts of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

/// The delivery address is outside every configured delivery zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("delivery address is outside the delivery area")]
pub struct OutOfRangeError;

/// Sum of all line totals.
#[must_use]
pub fn subtotal(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::line_total).sum()
}

/// Combine the item subtotal with the delivery fee.
///
/// This is also the submission-time re-check of deliverability: the quote a
/// customer saw and the moment they submit are separate events, so the range
/// verdict is checked again here.
///
/// # Errors
///
/// Returns [`OutOfRangeError`] when `in_range` is `false`, whatever the items.
pub fn assemble_total(
    items: &[OrderItem],
    delivery_fee: Decimal,
    in_range: bool,
) -> Result<OrderTotals, OutOfRangeError> {
    if !in_range {
        return Err(OutOfRangeError);
    }

    let subtotal = subtotal(items);
    Ok(OrderTotals {
        subtotal,
        delivery_fee,
        total: subtotal + delivery_fee,
    })
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub payment_method: String,
    #[cfg_attr(feature = "postgres", sqlx(json))]
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Charged amounts as a single value.
    #[must_use]
    pub const fn totals(&self) -> OrderTotals {
        OrderTotals {
            subtotal: self.subtotal,
            delivery_fee: self.delivery_fee,
            total: self.total,
        }
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(unit_price: i64, quantity: u32) -> OrderItem {
        OrderItem {
            product_id: ProductId::generate(),
            name: "X-Burguer".to_string(),
            unit_price: Decimal::from(unit_price),
            quantity,
            flavors: Vec::new(),
        }
    }

    #[test]
    fn test_assemble_total() {
        let items = [item(10, 2), item(5, 1)];
        let totals = assemble_total(&items, Decimal::from(3), true).unwrap();
        assert_eq!(
            totals,
            OrderTotals {
                subtotal: Decimal::from(25),
                delivery_fee: Decimal::from(3),
                total: Decimal::from(28),
            }
        );
    }

    #[test]
    fn test_out_of_range_is_rejected_regardless_of_items() {
        assert_eq!(
            assemble_total(&[item(10, 2)], Decimal::ZERO, false),
            Err(OutOfRangeError)
        );
        assert_eq!(assemble_total(&[], Decimal::ZERO, false), Err(OutOfRangeError));
    }

    #[test]
    fn test_empty_items_free_delivery() {
        let totals = assemble_total(&[], Decimal::ZERO, true).unwrap();
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_fractional_prices_stay_exact() {
        let line = OrderItem {
            unit_price: "12.90".parse().unwrap(),
            ..item(0, 3)
        };
        let totals = assemble_total(&[line], "4.99".parse().unwrap(), true).unwrap();
        assert_eq!(totals.subtotal, "38.70".parse::<Decimal>().unwrap());
        assert_eq!(totals.total, "43.69".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_item_json_omits_empty_flavors() {
        let json = serde_json::to_value(item(10, 1)).unwrap();
        assert!(json.get("flavors").is_none());
        assert_eq!(json["unit_price"], "10");
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn test_item_json_accepts_numeric_prices() {
        let json = serde_json::json!({
            "product_id": ProductId::generate(),
            "name": "Guaraná",
            "unit_price": 6.5,
            "quantity": 2
        });
        let parsed: OrderItem = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.line_total(), Decimal::from(13));
        assert!(parsed.flavors.is_empty());
    }
}
