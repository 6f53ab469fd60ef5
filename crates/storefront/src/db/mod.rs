//! Database operations for the storefront.
//!
//! # Tables read
//!
//! - `restaurant_settings` - Single row of restaurant configuration
//! - `menu_categories` / `menu_products` - The menu
//!
//! # Tables written
//!
//! - `orders` - Placed orders (insert only; status is owned by the admin service)
//!
//! # Migrations
//!
//! The schema is owned by the admin crate (`crates/admin/migrations/`) and
//! applied with:
//! ```bash
//! cargo run -p forno-cli -- migrate
//! ```

pub mod menu;
pub mod orders;
pub mod settings;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use menu::{Catalog, MenuRepository};
pub use orders::{NewOrder, OrderRepository};
pub use settings::SettingsRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
