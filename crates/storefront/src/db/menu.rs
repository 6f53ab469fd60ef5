//! Menu lookups.

use sqlx::PgPool;

use forno_core::menu::{MenuCategory, MenuProduct, available_flavors};
use forno_core::pizza::PizzaFlavor;
use forno_core::{CategoryId, ProductId};

use super::RepositoryError;

/// The full menu, loaded once per request.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub categories: Vec<MenuCategory>,
    pub products: Vec<MenuProduct>,
}

impl Catalog {
    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<&MenuCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&MenuProduct> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Available flavors of a pizza category.
    #[must_use]
    pub fn flavors(&self, category_id: CategoryId) -> Vec<PizzaFlavor> {
        available_flavors(category_id, &self.products)
    }
}

/// Read-only access to menu tables.
pub struct MenuRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuRepository<'a> {
    /// Create a new menu repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load every category and product, ordered by position.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn catalog(&self) -> Result<Catalog, RepositoryError> {
        let categories = sqlx::query_as::<_, MenuCategory>(
            r"
            SELECT id, name, icon, position, is_visible, is_promo, is_pizza_category,
                   pizza_sizes, pizza_price_method
            FROM menu_categories
            ORDER BY position, name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let products = sqlx::query_as::<_, MenuProduct>(
            r"
            SELECT id, category_id, name, description, price, image, position, available,
                   is_pizza_flavor
            FROM menu_products
            ORDER BY position, name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(Catalog {
            categories,
            products,
        })
    }
}
