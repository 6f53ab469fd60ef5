//! Multi-flavor pizza pricing.
//!
//! A customer may split one pizza into up to [`MAX_FLAVORS`] flavors. The
//! pizza's price is derived from the selected flavors' prices using the
//! category's [`PriceMethod`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProductId;

/// Maximum number of flavors on a single pizza.
pub const MAX_FLAVORS: usize = 3;

/// Aggregation rule for multi-flavor pizzas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PriceMethod {
    /// Charge the most expensive selected flavor.
    #[default]
    Highest,
    /// Charge the mean of the selected flavors.
    Average,
}

impl PriceMethod {
    /// Wire/database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Highest => "highest",
            Self::Average => "average",
        }
    }

    /// Parse a stored value, treating missing or unknown values as the default.
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    /// Effective method for a category: its own setting, else the
    /// restaurant-wide one.
    #[must_use]
    pub fn resolve(category: Option<Self>, restaurant: Self) -> Self {
        category.unwrap_or(restaurant)
    }
}

impl std::fmt::Display for PriceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PriceMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highest" => Ok(Self::Highest),
            "average" => Ok(Self::Average),
            _ => Err(format!("invalid pizza price method: {s}")),
        }
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PriceMethod {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PriceMethod {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PriceMethod {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

/// Price a pizza from its selected flavor prices.
///
/// Only the first [`MAX_FLAVORS`] prices are considered; extra entries are
/// ignored so the function never fails. An empty selection costs zero. No
/// rounding is applied: an average may carry more than two decimal places.
#[must_use]
pub fn calculate_pizza_price(selected_prices: &[Decimal], method: PriceMethod) -> Decimal {
    let prices = selected_prices.iter().take(MAX_FLAVORS).copied();

    match method {
        PriceMethod::Highest => prices.max().unwrap_or(Decimal::ZERO),
        PriceMethod::Average => {
            let count = selected_prices.len().min(MAX_FLAVORS);
            if count == 0 {
                return Decimal::ZERO;
            }
            prices.sum::<Decimal>() / Decimal::from(count)
        }
    }
}

/// A flavor that can be chosen for a multi-flavor pizza.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PizzaFlavor {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
}

/// Errors choosing pizza flavors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlavorSelectionError {
    /// No flavor was selected.
    #[error("select at least one flavor")]
    Empty,
    /// More than [`MAX_FLAVORS`] distinct flavors were selected.
    #[error("at most {max} flavors can be selected (got {count})")]
    TooMany {
        /// Number of distinct flavors submitted.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// A selected id is not a flavor of this category.
    #[error("unknown pizza flavor: {0}")]
    UnknownFlavor(ProductId),
}

/// A validated set of 1 to [`MAX_FLAVORS`] distinct flavor ids.
///
/// Order does not affect the price; ids are kept in the order given (minus
/// duplicates) so line names read the way the customer picked them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavorSelection(Vec<ProductId>);

impl FlavorSelection {
    /// Build a selection, dropping repeated ids.
    ///
    /// # Errors
    ///
    /// Returns [`FlavorSelectionError::Empty`] for no ids and
    /// [`FlavorSelectionError::TooMany`] for more than three distinct ids.
    pub fn new(ids: impl IntoIterator<Item = ProductId>) -> Result<Self, FlavorSelectionError> {
        let mut unique: Vec<ProductId> = Vec::with_capacity(MAX_FLAVORS);
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        if unique.is_empty() {
            return Err(FlavorSelectionError::Empty);
        }
        if unique.len() > MAX_FLAVORS {
            return Err(FlavorSelectionError::TooMany {
                count: unique.len(),
                max: MAX_FLAVORS,
            });
        }
        Ok(Self(unique))
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.0
    }

    /// Look up the selected flavors in a category's flavor list.
    ///
    /// # Errors
    ///
    /// Returns [`FlavorSelectionError::UnknownFlavor`] for the first id not
    /// present in `available`.
    pub fn resolve<'a>(
        &self,
        available: &'a [PizzaFlavor],
    ) -> Result<Vec<&'a PizzaFlavor>, FlavorSelectionError> {
        self.0
            .iter()
            .map(|id| {
                available
                    .iter()
                    .find(|flavor| flavor.id == *id)
                    .ok_or(FlavorSelectionError::UnknownFlavor(*id))
            })
            .collect()
    }
}

/// A priced pizza ready to become an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedPizza {
    /// Cart line name, e.g. `Pizza 2 Sabores: Calabresa + Mussarela`.
    pub name: String,
    pub price: Decimal,
    pub method: PriceMethod,
    pub flavors: Vec<PizzaFlavor>,
}

/// Price a selection against a category's flavors.
///
/// # Errors
///
/// Returns [`FlavorSelectionError::UnknownFlavor`] if a selected id is not in
/// `available`.
pub fn price_selection(
    selection: &FlavorSelection,
    available: &[PizzaFlavor],
    method: PriceMethod,
) -> Result<PricedPizza, FlavorSelectionError> {
    let flavors = selection.resolve(available)?;
    let prices: Vec<Decimal> = flavors.iter().map(|f| f.price).collect();
    let price = calculate_pizza_price(&prices, method);

    let names: Vec<&str> = flavors.iter().map(|f| f.name.as_str()).collect();
    let name = if names.len() > 1 {
        format!("Pizza {} Sabores: {}", names.len(), names.join(" + "))
    } else {
        format!("Pizza: {}", names.join(" + "))
    };

    Ok(PricedPizza {
        name,
        price,
        method,
        flavors: flavors.into_iter().cloned().collect(),
    })
}
