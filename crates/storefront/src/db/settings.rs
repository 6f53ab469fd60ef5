//! Restaurant settings lookup.

use sqlx::PgPool;

use forno_core::RestaurantSettings;
use forno_core::settings::SettingsRecord;

use super::RepositoryError;

/// Read-only access to the `restaurant_settings` row.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the restaurant settings with defaults applied.
    ///
    /// A missing row yields the defaults (unnamed, closed, free delivery).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self) -> Result<RestaurantSettings, RepositoryError> {
        let record = sqlx::query_as::<_, SettingsRecord>(
            r"
            SELECT id, name, logo, address, phone, whatsapp, is_open, opening_hours,
                   payment_methods, pix_key, pix_key_type, pizza_price_method,
                   base_address_lat, base_address_lng, delivery_zones
            FROM restaurant_settings
            ORDER BY created_at
            LIMIT 1
            ",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(RestaurantSettings::from_record(record.unwrap_or_default()))
    }
}
