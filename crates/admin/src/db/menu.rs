//! Menu category and product management.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;

use forno_core::menu::{MenuCategory, MenuProduct};
use forno_core::{CategoryId, PriceMethod, ProductId};

use super::{RepositoryError, map_reference_error};

const CATEGORY_COLUMNS: &str =
    "id, name, icon, position, is_visible, is_promo, is_pizza_category, pizza_sizes, \
     pizza_price_method";

const PRODUCT_COLUMNS: &str = "id, category_id, name, description, price, image, position, \
                               available, is_pizza_flavor";

/// Invalid category or product input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuInputError {
    #[error("name is required")]
    BlankName,
    #[error("price cannot be negative")]
    NegativePrice,
}

/// Every category and product, hidden and unavailable ones included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuListing {
    pub categories: Vec<MenuCategory>,
    pub products: Vec<MenuProduct>,
}

/// Fields of a category as created or edited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub is_promo: bool,
    #[serde(default)]
    pub is_pizza_category: bool,
    #[serde(default)]
    pub pizza_sizes: Vec<String>,
    /// `None` defers to the restaurant-wide method.
    #[serde(default)]
    pub pizza_price_method: Option<PriceMethod>,
}

impl CategoryInput {
    /// Trim the name and size labels.
    ///
    /// # Errors
    ///
    /// Returns `MenuInputError::BlankName` for an empty name.
    pub fn validate(self) -> Result<Self, MenuInputError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(MenuInputError::BlankName);
        }
        let pizza_sizes = self
            .pizza_sizes
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            name,
            pizza_sizes,
            ..self
        })
    }
}

/// Fields of a product as created or edited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductInput {
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub is_pizza_flavor: bool,
}

impl ProductInput {
    /// Trim text fields and check the price.
    ///
    /// # Errors
    ///
    /// Returns the first [`MenuInputError`] found.
    pub fn validate(self) -> Result<Self, MenuInputError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(MenuInputError::BlankName);
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(MenuInputError::NegativePrice);
        }
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            name,
            description,
            ..self
        })
    }
}

fn default_icon() -> String {
    "🍕".to_string()
}

const fn default_true() -> bool {
    true
}

/// Repository for menu management.
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
    pub async fn listing(&self) -> Result<MenuListing, RepositoryError> {
        let categories = sqlx::query_as::<_, MenuCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM menu_categories ORDER BY position, name"
        ))
        .fetch_all(self.pool)
        .await?;

        let products = sqlx::query_as::<_, MenuProduct>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM menu_products ORDER BY position, name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(MenuListing {
            categories,
            products,
        })
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_category(
        &self,
        input: &CategoryInput,
    ) -> Result<MenuCategory, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO menu_categories (name, icon, position, is_visible, is_promo,
                                         is_pizza_category, pizza_sizes, pizza_price_method)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {CATEGORY_COLUMNS}
            "
        );

        let category = bind_category(sqlx::query_as::<_, MenuCategory>(&sql), input)
            .fetch_one(self.pool)
            .await?;

        Ok(category)
    }

    /// Replace a category's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<MenuCategory, RepositoryError> {
        let sql = format!(
            r"
            UPDATE menu_categories
            SET name = $1, icon = $2, position = $3, is_visible = $4, is_promo = $5,
                is_pizza_category = $6, pizza_sizes = $7, pizza_price_method = $8
            WHERE id = $9
            RETURNING {CATEGORY_COLUMNS}
            "
        );

        bind_category(sqlx::query_as::<_, MenuCategory>(&sql), input)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category and, by cascade, its products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM menu_categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_product(&self, input: &ProductInput) -> Result<MenuProduct, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO menu_products (category_id, name, description, price, image, position,
                                       available, is_pizza_flavor)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "
        );

        bind_product(sqlx::query_as::<_, MenuProduct>(&sql), input)
            .fetch_one(self.pool)
            .await
            .map_err(|e| map_reference_error(e, "category does not exist"))
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new category doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<MenuProduct, RepositoryError> {
        let sql = format!(
            r"
            UPDATE menu_products
            SET category_id = $1, name = $2, description = $3, price = $4, image = $5,
                position = $6, available = $7, is_pizza_flavor = $8
            WHERE id = $9
            RETURNING {PRODUCT_COLUMNS}
            "
        );

        bind_product(sqlx::query_as::<_, MenuProduct>(&sql), input)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| map_reference_error(e, "category does not exist"))?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Past orders keep their copy of its name and price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM menu_products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

type PgQueryAs<'q, T> = sqlx::query::QueryAs<'q, sqlx::Postgres, T, sqlx::postgres::PgArguments>;

fn bind_category<'q>(
    query: PgQueryAs<'q, MenuCategory>,
    input: &'q CategoryInput,
) -> PgQueryAs<'q, MenuCategory> {
    query
        .bind(&input.name)
        .bind(&input.icon)
        .bind(input.position)
        .bind(input.is_visible)
        .bind(input.is_promo)
        .bind(input.is_pizza_category)
        .bind(&input.pizza_sizes)
        .bind(input.pizza_price_method)
}

fn bind_product<'q>(
    query: PgQueryAs<'q, MenuProduct>,
    input: &'q ProductInput,
) -> PgQueryAs<'q, MenuProduct> {
    query
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.image)
        .bind(input.position)
        .bind(input.available)
        .bind(input.is_pizza_flavor)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_defaults_from_json() {
        let input: CategoryInput = serde_json::from_str(r#"{"name": "Pizzas"}"#).unwrap();
        assert_eq!(input.icon, "🍕");
        assert!(input.is_visible);
        assert!(!input.is_pizza_category);
        assert_eq!(input.pizza_price_method, None);
    }

    #[test]
    fn test_category_validation() {
        let input: CategoryInput = serde_json::from_str(
            r#"{"name": " Pizzas ", "is_pizza_category": true, "pizza_sizes": ["Grande", " "]}"#,
        )
        .unwrap();
        let valid = input.validate().unwrap();
        assert_eq!(valid.name, "Pizzas");
        assert_eq!(valid.pizza_sizes, ["Grande"]);

        let blank: CategoryInput = serde_json::from_str(r#"{"name": "  "}"#).unwrap();
        assert_eq!(blank.validate(), Err(MenuInputError::BlankName));
    }

    #[test]
    fn test_product_validation() {
        let category = CategoryId::generate();
        let json = serde_json::json!({
            "category_id": category,
            "name": "Calabresa",
            "description": "  ",
            "price": "45.90",
            "is_pizza_flavor": true,
        });
        let valid: ProductInput = serde_json::from_value(json).unwrap();
        let valid = valid.validate().unwrap();
        assert_eq!(valid.description, None);
        assert!(valid.available);
        assert_eq!(valid.price, "45.90".parse::<Decimal>().unwrap());

        let negative = ProductInput {
            price: "-1".parse().unwrap(),
            ..valid
        };
        assert_eq!(negative.validate(), Err(MenuInputError::NegativePrice));
    }
}
