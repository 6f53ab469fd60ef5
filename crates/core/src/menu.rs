//! Menu categories and products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pizza::{PizzaFlavor, PriceMethod};
use crate::types::{CategoryId, ProductId};

/// A menu section, e.g. "Pizzas" or "Bebidas".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct MenuCategory {
    pub id: CategoryId,
    pub name: String,
    /// Emoji or icon name shown next to the category.
    pub icon: String,
    pub position: i32,
    pub is_visible: bool,
    pub is_promo: bool,
    /// Products of a pizza category can be combined as flavors.
    pub is_pizza_category: bool,
    pub pizza_sizes: Vec<String>,
    /// Category override; `None` defers to the restaurant setting.
    pub pizza_price_method: Option<PriceMethod>,
}

impl MenuCategory {
    /// Effective pizza price method for this category.
    #[must_use]
    pub fn price_method(&self, restaurant_default: PriceMethod) -> PriceMethod {
        PriceMethod::resolve(self.pizza_price_method, restaurant_default)
    }
}

/// A product on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct MenuProduct {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image: Option<String>,
    pub position: i32,
    pub available: bool,
    /// Selectable as a flavor in multi-flavor pizzas.
    pub is_pizza_flavor: bool,
}

impl MenuProduct {
    /// This product as a pizza flavor, if it is one.
    #[must_use]
    pub fn as_flavor(&self) -> Option<PizzaFlavor> {
        self.is_pizza_flavor.then(|| PizzaFlavor {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
        })
    }
}

/// A category with its products, as presented to customers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSection {
    #[serde(flatten)]
    pub category: MenuCategory,
    /// Effective price method (category override or restaurant default).
    pub effective_price_method: PriceMethod,
    pub products: Vec<MenuProduct>,
}

/// Group products under their categories, ordered by position.
///
/// Hidden categories and unavailable products are dropped, matching what
/// customers are allowed to order. Products whose category is missing are
/// ignored.
#[must_use]
pub fn customer_menu(
    categories: &[MenuCategory],
    products: &[MenuProduct],
    restaurant_price_method: PriceMethod,
) -> Vec<MenuSection> {
    let mut visible: Vec<&MenuCategory> = categories.iter().filter(|c| c.is_visible).collect();
    visible.sort_by_key(|c| c.position);

    visible
        .into_iter()
        .map(|category| {
            let mut items: Vec<MenuProduct> = products
                .iter()
                .filter(|p| p.category_id == category.id && p.available)
                .cloned()
                .collect();
            items.sort_by_key(|p| p.position);

            MenuSection {
                category: category.clone(),
                effective_price_method: category.price_method(restaurant_price_method),
                products: items,
            }
        })
        .collect()
}

/// Available pizza flavors of a category.
#[must_use]
pub fn available_flavors(category_id: CategoryId, products: &[MenuProduct]) -> Vec<PizzaFlavor> {
    products
        .iter()
        .filter(|p| p.category_id == category_id && p.available)
        .filter_map(MenuProduct::as_flavor)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, position: i32, is_visible: bool) -> MenuCategory {
        MenuCategory {
            id: CategoryId::generate(),
            name: name.to_string(),
            icon: "🍕".to_string(),
            position,
            is_visible,
            is_promo: false,
            is_pizza_category: false,
            pizza_sizes: Vec::new(),
            pizza_price_method: None,
        }
    }

    fn product(category: &MenuCategory, name: &str, position: i32) -> MenuProduct {
        MenuProduct {
            id: ProductId::generate(),
            category_id: category.id,
            name: name.to_string(),
            description: None,
            price: Decimal::from(30),
            image: None,
            position,
            available: true,
            is_pizza_flavor: false,
        }
    }

    #[test]
    fn test_customer_menu_orders_and_filters() {
        let drinks = category("Bebidas", 2, true);
        let pizzas = category("Pizzas", 1, true);
        let secret = category("Interno", 0, false);

        let mut sold_out = product(&pizzas, "Atum", 0);
        sold_out.available = false;
        let products = vec![
            product(&drinks, "Suco", 1),
            product(&pizzas, "Calabresa", 2),
            product(&pizzas, "Mussarela", 1),
            product(&secret, "Teste", 0),
            sold_out,
        ];

        let menu = customer_menu(&[drinks, pizzas, secret], &products, PriceMethod::Highest);

        let names: Vec<&str> = menu.iter().map(|s| s.category.name.as_str()).collect();
        assert_eq!(names, ["Pizzas", "Bebidas"]);

        let pizza_names: Vec<&str> = menu[0].products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(pizza_names, ["Mussarela", "Calabresa"]);
    }

    #[test]
    fn test_category_override_wins() {
        let mut pizzas = category("Pizzas", 0, true);
        pizzas.pizza_price_method = Some(PriceMethod::Average);
        let menu = customer_menu(&[pizzas], &[], PriceMethod::Highest);
        assert_eq!(menu[0].effective_price_method, PriceMethod::Average);
    }

    #[test]
    fn test_available_flavors_only_flavors_of_category() {
        let pizzas = category("Pizzas", 0, true);
        let other = category("Doces", 1, true);

        let mut calabresa = product(&pizzas, "Calabresa", 0);
        calabresa.is_pizza_flavor = true;
        let mut chocolate = product(&other, "Chocolate", 0);
        chocolate.is_pizza_flavor = true;
        let borda = product(&pizzas, "Borda recheada", 1);

        let flavors = available_flavors(pizzas.id, &[calabresa.clone(), chocolate, borda]);
        assert_eq!(flavors.len(), 1);
        assert_eq!(flavors[0].id, calabresa.id);
    }
}
