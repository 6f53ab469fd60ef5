//! Restaurant settings storage.
//!
//! The table holds a single row, seeded by the migrations. Reads apply the
//! same defaults the storefront sees.

use sqlx::PgPool;
use sqlx::types::Json;

use forno_core::settings::SettingsRecord;
use forno_core::{DeliverySettings, GeneralSettings, RestaurantSettings};

use super::RepositoryError;

const SETTINGS_COLUMNS: &str = "id, name, logo, address, phone, whatsapp, is_open, opening_hours, \
                                payment_methods, pix_key, pix_key_type, pizza_price_method, \
                                base_address_lat, base_address_lng, delivery_zones";

/// Repository for the `restaurant_settings` row.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the settings with defaults applied.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row was never seeded.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self) -> Result<RestaurantSettings, RepositoryError> {
        let sql = format!(
            "SELECT {SETTINGS_COLUMNS} FROM restaurant_settings ORDER BY created_at LIMIT 1"
        );

        let record = sqlx::query_as::<_, SettingsRecord>(&sql)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(RestaurantSettings::from_record(record))
    }

    /// Save general settings. `update` must already be validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row was never seeded.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_general(
        &self,
        update: &GeneralSettings,
    ) -> Result<RestaurantSettings, RepositoryError> {
        let sql = format!(
            r"
            UPDATE restaurant_settings
            SET name = $1, logo = $2, address = $3, phone = $4, whatsapp = $5, is_open = $6,
                opening_hours = $7, payment_methods = $8, pix_key = $9, pix_key_type = $10,
                pizza_price_method = $11
            WHERE id = (SELECT id FROM restaurant_settings ORDER BY created_at LIMIT 1)
            RETURNING {SETTINGS_COLUMNS}
            "
        );

        let record = sqlx::query_as::<_, SettingsRecord>(&sql)
            .bind(&update.name)
            .bind(&update.logo)
            .bind(&update.address)
            .bind(&update.phone)
            .bind(&update.whatsapp)
            .bind(update.is_open)
            .bind(Json(&update.opening_hours))
            .bind(&update.payment_methods)
            .bind(&update.pix_key)
            .bind(&update.pix_key_type)
            .bind(update.pizza_price_method)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(RestaurantSettings::from_record(record))
    }

    /// Save the restaurant location and delivery zones. `update` must
    /// already be validated (zones sorted).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row was never seeded.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_delivery(
        &self,
        update: &DeliverySettings,
    ) -> Result<RestaurantSettings, RepositoryError> {
        let sql = format!(
            r"
            UPDATE restaurant_settings
            SET base_address_lat = $1, base_address_lng = $2, delivery_zones = $3
            WHERE id = (SELECT id FROM restaurant_settings ORDER BY created_at LIMIT 1)
            RETURNING {SETTINGS_COLUMNS}
            "
        );

        let record = sqlx::query_as::<_, SettingsRecord>(&sql)
            .bind(update.base_address_lat)
            .bind(update.base_address_lng)
            .bind(Json(&update.delivery_zones))
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(RestaurantSettings::from_record(record))
    }
}
