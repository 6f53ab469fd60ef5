//! Admin dashboard statistics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::types::OrderStatus;

/// Headline numbers for a set of orders (typically today's).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DashboardStats {
    pub order_count: usize,
    /// Sum of order totals.
    pub revenue: Decimal,
    /// Orders currently in the kitchen.
    pub preparing_count: usize,
    /// `revenue / order_count`, zero when there are no orders.
    pub average_ticket: Decimal,
}

impl DashboardStats {
    #[must_use]
    pub fn from_orders(orders: &[Order]) -> Self {
        let order_count = orders.len();
        let revenue: Decimal = orders.iter().map(|o| o.total).sum();
        let preparing_count = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Preparing)
            .count();
        let average_ticket = if order_count == 0 {
            Decimal::ZERO
        } else {
            revenue / Decimal::from(order_count)
        };

        Self {
            order_count,
            revenue,
            preparing_count,
            average_ticket,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::OrderId;

    fn order(total: i64, status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::generate(),
            customer_name: "Cliente".to_string(),
            customer_phone: "11999999999".to_string(),
            customer_address: "Rua A, 1".to_string(),
            payment_method: "Pix".to_string(),
            items: Vec::new(),
            subtotal: Decimal::from(total),
            delivery_fee: Decimal::ZERO,
            total: Decimal::from(total),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_no_orders() {
        assert_eq!(DashboardStats::from_orders(&[]), DashboardStats::default());
    }

    #[test]
    fn test_stats() {
        let orders = [
            order(30, OrderStatus::Pending),
            order(50, OrderStatus::Preparing),
            order(40, OrderStatus::Preparing),
            order(80, OrderStatus::Delivered),
        ];
        let stats = DashboardStats::from_orders(&orders);
        assert_eq!(stats.order_count, 4);
        assert_eq!(stats.revenue, Decimal::from(200));
        assert_eq!(stats.preparing_count, 2);
        assert_eq!(stats.average_ticket, Decimal::from(50));
    }
}
