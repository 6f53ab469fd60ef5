//! Order queries and status updates.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use forno_core::{Order, OrderId, OrderStatus};

use super::RepositoryError;

const ORDER_COLUMNS: &str = "id, customer_name, customer_phone, customer_address, payment_method, \
                             items, subtotal, delivery_fee, total, status, created_at, updated_at";

/// Default and maximum page size for order listings.
pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 500;

/// Filters for listing orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders in this status.
    pub status: Option<OrderStatus>,
    /// Case-insensitive match on customer name or phone.
    pub search: Option<String>,
    /// Only orders placed at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Page size; clamped to `1..=MAX_LIMIT`.
    pub limit: Option<i64>,
}

impl OrderFilter {
    fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// `ILIKE` pattern for the search term, with wildcards escaped.
    fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        Some(format!("%{escaped}%"))
    }
}

/// Repository for order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR customer_name ILIKE $2 OR customer_phone ILIKE $2)
              AND ($3::timestamptz IS NULL OR created_at >= $3)
            ORDER BY created_at DESC
            LIMIT $4
            "
        );

        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(filter.status)
            .bind(filter.search_pattern())
            .bind(filter.since)
            .bind(filter.effective_limit())
            .fetch_all(self.pool)
            .await?;

        Ok(orders)
    }

    /// Every order placed at or after `since`, for dashboard statistics.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn placed_since(&self, since: DateTime<Utc>) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE created_at >= $1 ORDER BY created_at DESC"
        );

        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(since)
            .fetch_all(self.pool)
            .await?;

        Ok(orders)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(order)
    }

    /// Move an order from `from` to `to`.
    ///
    /// The update only applies while the order is still in `from`, so two
    /// staff members advancing the same order cannot skip a step.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order is no longer in `from`.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let sql = format!(
            "UPDATE orders SET status = $3 WHERE id = $1 AND status = $2 RETURNING {ORDER_COLUMNS}"
        );

        sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| RepositoryError::Conflict(format!("order is no longer {from}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(OrderFilter::default().effective_limit(), DEFAULT_LIMIT);

        let huge = OrderFilter {
            limit: Some(10_000),
            ..OrderFilter::default()
        };
        assert_eq!(huge.effective_limit(), MAX_LIMIT);

        let zero = OrderFilter {
            limit: Some(0),
            ..OrderFilter::default()
        };
        assert_eq!(zero.effective_limit(), 1);
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let filter = OrderFilter {
            search: Some(" 50%_off ".to_string()),
            ..OrderFilter::default()
        };
        assert_eq!(filter.search_pattern().as_deref(), Some("%50\\%\\_off%"));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter = OrderFilter {
            search: Some("   ".to_string()),
            ..OrderFilter::default()
        };
        assert_eq!(filter.search_pattern(), None);
    }
}
