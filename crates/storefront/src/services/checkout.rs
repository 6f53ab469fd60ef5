//! Server-side cart pricing and checkout.
//!
//! Prices submitted by clients are never trusted: every line is repriced from
//! the current menu, the delivery fee is re-quoted from the restaurant's
//! zones, and [`assemble_total`] makes the final deliverability check.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use thiserror::Error;

use forno_core::checkout::{CheckoutFormError, ValidCheckout};
use forno_core::pizza::{FlavorSelectionError, PricedPizza, price_selection};
use forno_core::{
    CategoryId, CheckoutForm, Coordinates, DeliveryQuote, FlavorSelection, OrderItem,
    OutOfRangeError, PixInstructions, ProductId, RestaurantSettings, assemble_total,
};

use crate::db::{Catalog, NewOrder};

/// Most units of one cart line.
pub const MAX_QUANTITY: u32 = 99;

/// Largest total an order can be stored with: 99999999.99, the limit of
/// `NUMERIC(10,2)`.
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Errors that reject a checkout or a pizza quote.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Customer details are invalid.
    #[error(transparent)]
    Form(#[from] CheckoutFormError),

    /// The restaurant is not taking orders.
    #[error("the restaurant is closed")]
    RestaurantClosed,

    /// No items were submitted.
    #[error("the cart is empty")]
    EmptyCart,

    /// A line quantity is zero or above [`MAX_QUANTITY`].
    #[error("item {index} must have a quantity between 1 and {MAX_QUANTITY}")]
    InvalidQuantity {
        /// Position of the line in the cart.
        index: usize,
    },

    /// A product is missing from the menu.
    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),

    /// A product exists but cannot be ordered right now.
    #[error("product unavailable: {0}")]
    ProductUnavailable(String),

    /// A category is missing from the menu.
    #[error("unknown category: {0}")]
    UnknownCategory(CategoryId),

    /// Flavors were submitted for a category that does not sell pizza.
    #[error("category does not offer multi-flavor pizzas: {0}")]
    NotPizzaCategory(CategoryId),

    /// The flavor selection is invalid.
    #[error(transparent)]
    Flavor(#[from] FlavorSelectionError),

    /// Delivery is priced by distance but no destination was given.
    #[error("select a delivery address from the suggestions")]
    MissingDestination,

    /// The destination is outside every delivery zone.
    #[error(transparent)]
    OutOfRange(#[from] OutOfRangeError),

    /// The order total exceeds [`MAX_ORDER_TOTAL`].
    #[error("order total cannot exceed {MAX_ORDER_TOTAL}")]
    TotalTooLarge,
}

/// One cart line as submitted by the customer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartLine {
    /// A regular menu product.
    Product { product_id: ProductId, quantity: u32 },
    /// A pizza of one to three flavors from a pizza category.
    Pizza {
        category_id: CategoryId,
        flavor_ids: Vec<ProductId>,
        quantity: u32,
    },
}

impl CartLine {
    const fn quantity(&self) -> u32 {
        match self {
            Self::Product { quantity, .. } | Self::Pizza { quantity, .. } => *quantity,
        }
    }
}

/// A checkout that passed every check, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedCheckout {
    pub order: NewOrder,
    pub delivery: DeliveryQuote,
    pub pix: Option<PixInstructions>,
}

/// Price a pizza from a category's current flavors.
///
/// # Errors
///
/// Returns `UnknownCategory`/`NotPizzaCategory` for a missing, hidden or
/// non-pizza category and `Flavor` for an invalid selection.
pub fn price_pizza(
    catalog: &Catalog,
    settings: &RestaurantSettings,
    category_id: CategoryId,
    flavor_ids: &[ProductId],
) -> Result<PricedPizza, CheckoutError> {
    let category = catalog
        .category(category_id)
        .filter(|c| c.is_visible)
        .ok_or(CheckoutError::UnknownCategory(category_id))?;
    if !category.is_pizza_category {
        return Err(CheckoutError::NotPizzaCategory(category_id));
    }

    let selection = FlavorSelection::new(flavor_ids.iter().copied())?;
    let method = category.price_method(settings.pizza_price_method);
    Ok(price_selection(&selection, &catalog.flavors(category_id), method)?)
}

/// Turn a cart line into an order item at current menu prices.
///
/// # Errors
///
/// Returns a `CheckoutError` if the product, category or flavors are invalid.
pub fn price_line(
    catalog: &Catalog,
    settings: &RestaurantSettings,
    line: &CartLine,
) -> Result<OrderItem, CheckoutError> {
    match line {
        CartLine::Product {
            product_id,
            quantity,
        } => {
            let product = catalog
                .product(*product_id)
                .ok_or(CheckoutError::UnknownProduct(*product_id))?;
            let listed = catalog
                .category(product.category_id)
                .is_some_and(|c| c.is_visible);
            if !product.available || !listed {
                return Err(CheckoutError::ProductUnavailable(product.name.clone()));
            }
            Ok(OrderItem {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                quantity: *quantity,
                flavors: Vec::new(),
            })
        }
        CartLine::Pizza {
            category_id,
            flavor_ids,
            quantity,
        } => {
            let pizza = price_pizza(catalog, settings, *category_id, flavor_ids)?;
            let first = pizza.flavors.first().ok_or(FlavorSelectionError::Empty)?;
            Ok(OrderItem {
                product_id: first.id,
                name: pizza.name.clone(),
                unit_price: to_cents(pizza.price),
                quantity: *quantity,
                flavors: pizza.flavors.iter().map(|f| f.name.clone()).collect(),
            })
        }
    }
}

/// Validate and price a checkout.
///
/// # Errors
///
/// Returns the first `CheckoutError` found: closed restaurant, form errors,
/// cart errors, a missing destination, the out-of-range re-check, then a
/// total too large to store.
pub fn prepare_checkout(
    settings: &RestaurantSettings,
    catalog: &Catalog,
    form: &CheckoutForm,
    lines: &[CartLine],
    destination: Option<Coordinates>,
) -> Result<PricedCheckout, CheckoutError> {
    if !settings.is_open {
        return Err(CheckoutError::RestaurantClosed);
    }

    let ValidCheckout {
        name,
        phone,
        address,
        payment_method,
    } = form.validate(settings)?;

    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let items = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            if !(1..=MAX_QUANTITY).contains(&line.quantity()) {
                return Err(CheckoutError::InvalidQuantity { index });
            }
            price_line(catalog, settings, line)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let delivery = match destination {
        Some(destination) => {
            let quote = settings.quote_delivery(destination);
            DeliveryQuote {
                fee: to_cents(quote.fee),
                ..quote
            }
        }
        None if settings.delivery_zones_enabled() => {
            return Err(CheckoutError::MissingDestination);
        }
        None => DeliveryQuote::UNPRICED,
    };

    let totals = assemble_total(&items, delivery.fee, delivery.in_range)?;
    if totals.total > MAX_ORDER_TOTAL {
        return Err(CheckoutError::TotalTooLarge);
    }
    let pix = PixInstructions::for_payment(settings, &payment_method, totals.total);

    Ok(PricedCheckout {
        order: NewOrder {
            customer_name: name,
            customer_phone: phone,
            customer_address: address,
            payment_method,
            items,
            totals,
        },
        delivery,
        pix,
    })
}

/// Round a computed price to whole cents for storage.
fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use forno_core::menu::{MenuCategory, MenuProduct};
    use forno_core::settings::SettingsRecord;
    use forno_core::{DeliveryZone, PriceMethod, SettingsId};

    use super::*;

    fn money(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    struct Fixture {
        catalog: Catalog,
        pizzas: CategoryId,
        drinks: CategoryId,
        calabresa: ProductId,
        mussarela: ProductId,
        portuguesa: ProductId,
        suco: ProductId,
    }

    fn category(name: &str, is_pizza_category: bool) -> MenuCategory {
        MenuCategory {
            id: CategoryId::generate(),
            name: name.to_string(),
            icon: String::new(),
            position: 0,
            is_visible: true,
            is_promo: false,
            is_pizza_category,
            pizza_sizes: Vec::new(),
            pizza_price_method: None,
        }
    }

    fn product(category: &MenuCategory, name: &str, price: &str, flavor: bool) -> MenuProduct {
        MenuProduct {
            id: ProductId::generate(),
            category_id: category.id,
            name: name.to_string(),
            description: None,
            price: money(price),
            image: None,
            position: 0,
            available: true,
            is_pizza_flavor: flavor,
        }
    }

    fn fixture() -> Fixture {
        let pizzas = category("Pizzas", true);
        let drinks = category("Bebidas", false);
        let calabresa = product(&pizzas, "Calabresa", "40.00", true);
        let mussarela = product(&pizzas, "Mussarela", "35.00", true);
        let portuguesa = product(&pizzas, "Portuguesa", "45.01", true);
        let suco = product(&drinks, "Suco", "8.50", false);

        Fixture {
            pizzas: pizzas.id,
            drinks: drinks.id,
            calabresa: calabresa.id,
            mussarela: mussarela.id,
            portuguesa: portuguesa.id,
            suco: suco.id,
            catalog: Catalog {
                categories: vec![pizzas, drinks],
                products: vec![calabresa, mussarela, portuguesa, suco],
            },
        }
    }

    fn settings(zones: bool) -> RestaurantSettings {
        let mut settings = RestaurantSettings::from_record(SettingsRecord {
            id: SettingsId::generate(),
            name: "Forno".to_string(),
            is_open: true,
            pix_key: Some("pix@forno.app".to_string()),
            ..SettingsRecord::default()
        });
        if zones {
            settings.base_address_lat = Some(0.0);
            settings.base_address_lng = Some(0.0);
            settings.delivery_zones = vec![
                DeliveryZone::new(3.0, money("5")),
                DeliveryZone::new(6.0, money("8")),
            ];
        }
        settings
    }

    fn form(payment_method: &str) -> CheckoutForm {
        CheckoutForm {
            name: "Maria".to_string(),
            phone: "11987654321".to_string(),
            address: "Rua das Flores, 10".to_string(),
            payment_method: payment_method.to_string(),
        }
    }

    /// About 2.2 km east of the origin.
    const NEAR: Coordinates = Coordinates::new(0.0, 0.02);
    /// About 11 km east of the origin.
    const FAR: Coordinates = Coordinates::new(0.0, 0.1);

    #[test]
    fn test_checkout_reprices_and_adds_fee() {
        let f = fixture();
        let lines = [
            CartLine::Product {
                product_id: f.suco,
                quantity: 2,
            },
            CartLine::Pizza {
                category_id: f.pizzas,
                flavor_ids: vec![f.calabresa, f.mussarela],
                quantity: 1,
            },
        ];

        let priced = prepare_checkout(&settings(true), &f.catalog, &form("Dinheiro"), &lines, Some(NEAR))
            .unwrap();

        assert_eq!(priced.order.items[1].name, "Pizza 2 Sabores: Calabresa + Mussarela");
        assert_eq!(priced.order.items[1].unit_price, money("40.00"));
        assert_eq!(priced.order.items[1].product_id, f.calabresa);
        assert_eq!(priced.order.totals.subtotal, money("57.00"));
        assert_eq!(priced.order.totals.delivery_fee, money("5"));
        assert_eq!(priced.order.totals.total, money("62.00"));
        assert!(priced.delivery.in_range);
        assert_eq!(priced.pix, None);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let f = fixture();
        let lines = [CartLine::Product {
            product_id: f.suco,
            quantity: 1,
        }];
        let err = prepare_checkout(&settings(true), &f.catalog, &form("Pix"), &lines, Some(FAR))
            .unwrap_err();
        assert!(matches!(err, CheckoutError::OutOfRange(_)));
    }

    #[test]
    fn test_destination_required_only_with_zones() {
        let f = fixture();
        let lines = [CartLine::Product {
            product_id: f.suco,
            quantity: 1,
        }];

        let err = prepare_checkout(&settings(true), &f.catalog, &form("Pix"), &lines, None)
            .unwrap_err();
        assert!(matches!(err, CheckoutError::MissingDestination));

        let priced =
            prepare_checkout(&settings(false), &f.catalog, &form("Pix"), &lines, None).unwrap();
        assert_eq!(priced.delivery, DeliveryQuote::UNPRICED);
        assert_eq!(priced.order.totals.total, money("8.50"));
    }

    #[test]
    fn test_pix_instructions_carry_total() {
        let f = fixture();
        let lines = [CartLine::Product {
            product_id: f.suco,
            quantity: 3,
        }];
        let priced =
            prepare_checkout(&settings(false), &f.catalog, &form("pix"), &lines, None).unwrap();

        assert_eq!(priced.order.payment_method, "Pix");
        let pix = priced.pix.unwrap();
        assert_eq!(pix.key, "pix@forno.app");
        assert_eq!(pix.amount, money("25.50"));
    }

    #[test]
    fn test_cart_errors() {
        let f = fixture();
        let s = settings(false);

        let err = prepare_checkout(&s, &f.catalog, &form("Pix"), &[], None).unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));

        let zero = [CartLine::Product {
            product_id: f.suco,
            quantity: 0,
        }];
        let err = prepare_checkout(&s, &f.catalog, &form("Pix"), &zero, None).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidQuantity { index: 0 }));

        let unknown = [CartLine::Product {
            product_id: ProductId::generate(),
            quantity: 1,
        }];
        let err = prepare_checkout(&s, &f.catalog, &form("Pix"), &unknown, None).unwrap_err();
        assert!(matches!(err, CheckoutError::UnknownProduct(_)));
    }

    #[test]
    fn test_closed_restaurant_rejects_checkout() {
        let f = fixture();
        let mut s = settings(false);
        s.is_open = false;
        let lines = [CartLine::Product {
            product_id: f.suco,
            quantity: 1,
        }];
        let err = prepare_checkout(&s, &f.catalog, &form("Pix"), &lines, None).unwrap_err();
        assert!(matches!(err, CheckoutError::RestaurantClosed));
    }

    #[test]
    fn test_pizza_rules() {
        let f = fixture();
        let s = settings(false);

        let four = [f.calabresa, f.mussarela, f.portuguesa, f.suco];
        let err = price_pizza(&f.catalog, &s, f.pizzas, &four).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Flavor(FlavorSelectionError::TooMany { count: 4, max: 3 })
        ));

        let err = price_pizza(&f.catalog, &s, f.drinks, &[f.suco]).unwrap_err();
        assert!(matches!(err, CheckoutError::NotPizzaCategory(_)));

        // A drink is not a flavor of the pizza category.
        let err = price_pizza(&f.catalog, &s, f.pizzas, &[f.suco]).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Flavor(FlavorSelectionError::UnknownFlavor(_))
        ));
    }

    #[test]
    fn test_average_pizza_is_rounded_to_cents_on_the_order() {
        let mut f = fixture();
        f.catalog.categories[0].pizza_price_method = Some(PriceMethod::Average);
        let s = settings(false);

        let ids = [f.calabresa, f.mussarela, f.portuguesa];
        let pizza = price_pizza(&f.catalog, &s, f.pizzas, &ids).unwrap();
        // (40.00 + 35.00 + 45.01) / 3 = 40.00333...
        assert!(pizza.price > money("40.00"));

        let line = CartLine::Pizza {
            category_id: f.pizzas,
            flavor_ids: ids.to_vec(),
            quantity: 1,
        };
        let item = price_line(&f.catalog, &s, &line).unwrap();
        assert_eq!(item.unit_price, money("40.00"));
        assert_eq!(item.flavors, ["Calabresa", "Mussarela", "Portuguesa"]);
    }

    #[test]
    fn test_hidden_category_cannot_be_ordered() {
        let mut f = fixture();
        for category in &mut f.catalog.categories {
            category.is_visible = false;
        }
        let s = settings(false);

        let drink = [CartLine::Product {
            product_id: f.suco,
            quantity: 1,
        }];
        let err = prepare_checkout(&s, &f.catalog, &form("Pix"), &drink, None).unwrap_err();
        assert!(matches!(err, CheckoutError::ProductUnavailable(ref name) if name == "Suco"));

        let err = price_pizza(&f.catalog, &s, f.pizzas, &[f.calabresa]).unwrap_err();
        assert!(matches!(err, CheckoutError::UnknownCategory(id) if id == f.pizzas));

        let pizza = [CartLine::Pizza {
            category_id: f.pizzas,
            flavor_ids: vec![f.calabresa],
            quantity: 1,
        }];
        let err = prepare_checkout(&s, &f.catalog, &form("Pix"), &pizza, None).unwrap_err();
        assert!(matches!(err, CheckoutError::UnknownCategory(_)));
    }

    #[test]
    fn test_fractional_cent_fee_is_rounded_before_totalling() {
        let f = fixture();
        let mut s = settings(true);
        s.delivery_zones = vec![DeliveryZone::new(3.0, money("4.999"))];
        let lines = [CartLine::Product {
            product_id: f.suco,
            quantity: 1,
        }];

        let priced =
            prepare_checkout(&s, &f.catalog, &form("Pix"), &lines, Some(NEAR)).unwrap();
        assert_eq!(priced.delivery.fee, money("5.00"));
        assert_eq!(priced.order.totals.delivery_fee, money("5.00"));
        assert_eq!(priced.order.totals.total, money("13.50"));
        assert_eq!(priced.pix.unwrap().amount, priced.order.totals.total);
    }

    #[test]
    fn test_quantity_upper_bound() {
        let f = fixture();
        let s = settings(false);
        let line = |quantity| {
            [CartLine::Product {
                product_id: f.suco,
                quantity,
            }]
        };

        let priced =
            prepare_checkout(&s, &f.catalog, &form("Pix"), &line(MAX_QUANTITY), None).unwrap();
        assert_eq!(priced.order.totals.total, money("841.50"));

        let err = prepare_checkout(&s, &f.catalog, &form("Pix"), &line(MAX_QUANTITY + 1), None)
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidQuantity { index: 0 }));

        let err = prepare_checkout(&s, &f.catalog, &form("Pix"), &line(4_000_000_000), None)
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidQuantity { index: 0 }));
    }

    #[test]
    fn test_total_above_storage_limit_is_rejected() {
        let mut f = fixture();
        f.catalog.products[3].price = money("50000000.00");
        let lines = [CartLine::Product {
            product_id: f.suco,
            quantity: 2,
        }];
        let err = prepare_checkout(&settings(false), &f.catalog, &form("Pix"), &lines, None)
            .unwrap_err();
        assert!(matches!(err, CheckoutError::TotalTooLarge));
        assert_eq!(MAX_ORDER_TOTAL.to_string(), "99999999.99");
    }

    #[test]
    fn test_cart_line_wire_format() {
        let json = r#"{"type": "pizza", "category_id": "00000000-0000-0000-0000-000000000001",
                       "flavor_ids": ["00000000-0000-0000-0000-000000000002"], "quantity": 2}"#;
        let line: CartLine = serde_json::from_str(json).unwrap();
        assert!(matches!(line, CartLine::Pizza { quantity: 2, .. }));
    }
}
