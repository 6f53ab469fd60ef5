//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::geocoding::{GeocodingClient, GeocodingError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    geocoder: GeocodingClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the geocoder URL is unusable.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, GeocodingError> {
        let geocoder = GeocodingClient::new(&config.geocoder)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                geocoder,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the address search client.
    #[must_use]
    pub fn geocoder(&self) -> &GeocodingClient {
        &self.inner.geocoder
    }
}
