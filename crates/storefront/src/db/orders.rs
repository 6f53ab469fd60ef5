//! Order persistence.

use sqlx::PgPool;
use sqlx::types::Json;

use forno_core::{Order, OrderItem, OrderTotals};

use super::RepositoryError;

/// A validated, priced order ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub payment_method: String,
    pub items: Vec<OrderItem>,
    pub totals: OrderTotals,
}

/// Repository for placing orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order in `pending` status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let OrderTotals {
            subtotal,
            delivery_fee,
            total,
        } = order.totals;

        let created = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO orders (customer_name, customer_phone, customer_address, payment_method,
                                items, subtotal, delivery_fee, total)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, customer_name, customer_phone, customer_address, payment_method,
                      items, subtotal, delivery_fee, total, status, created_at, updated_at
            ",
        )
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.customer_address)
        .bind(&order.payment_method)
        .bind(Json(&order.items))
        .bind(subtotal)
        .bind(delivery_fee)
        .bind(total)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }
}
