//! Integration tests for Forno.
//!
//! # Running Tests
//!
//! ```bash
//! # Hermetic tests (pricing pipeline, order events)
//! cargo test -p forno-integration-tests
//!
//! # Live API tests against running servers and a migrated database
//! cargo run -p forno-cli -- migrate
//! cargo run -p forno-storefront &
//! cargo run -p forno-admin &
//! cargo test -p forno-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `checkout_pipeline` - Settings, menu and cart priced end to end
//! - `order_events` - Trigger payloads, status lifecycle and dashboard numbers
//! - `live_api` - Storefront and admin HTTP APIs (ignored by default)
//!
//! This library holds the fixtures those tests share.

#![cfg_attr(not(test), forbid(unsafe_code))]

use rust_decimal::Decimal;
use serde_json::json;

use forno_core::menu::{MenuCategory, MenuProduct};
use forno_core::settings::SettingsRecord;
use forno_core::{CategoryId, PriceMethod, ProductId, RestaurantSettings, SettingsId};
use forno_storefront::db::Catalog;

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin API (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Parse a decimal literal such as `"45.01"`.
///
/// # Panics
///
/// Panics on a malformed literal; fixtures only pass constants.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn money(value: &str) -> Decimal {
    value.parse().unwrap()
}

/// Restaurant location used by every fixture (Praça da Sé, São Paulo).
pub const RESTAURANT_LAT: f64 = -23.5505;
pub const RESTAURANT_LNG: f64 = -46.6333;

/// Settings as they come out of a freshly configured database row: open,
/// Pix enabled, two delivery zones stored unsorted.
#[must_use]
pub fn restaurant_settings() -> RestaurantSettings {
    RestaurantSettings::from_record(SettingsRecord {
        id: SettingsId::generate(),
        name: "Forno da Vila".to_string(),
        is_open: true,
        opening_hours: json!({ "monday": { "open": "18:00", "close": "23:30" } }),
        payment_methods: vec!["Dinheiro".to_string(), "Pix".to_string()],
        pix_key: Some("pix@fornodavila.com.br".to_string()),
        pix_key_type: Some("email".to_string()),
        pizza_price_method: Some("highest".to_string()),
        base_address_lat: Some(RESTAURANT_LAT),
        base_address_lng: Some(RESTAURANT_LNG),
        delivery_zones: json!([
            { "max_distance_km": 6, "fee": 9.5 },
            { "max_distance_km": 3, "fee": 5 }
        ]),
        ..SettingsRecord::default()
    })
}

/// IDs of the products in [`menu`].
#[derive(Debug, Clone, Copy)]
pub struct MenuIds {
    pub pizzas: CategoryId,
    pub sweet_pizzas: CategoryId,
    pub drinks: CategoryId,
    pub calabresa: ProductId,
    pub mussarela: ProductId,
    pub portuguesa: ProductId,
    pub frango: ProductId,
    pub chocolate: ProductId,
    pub banana: ProductId,
    pub guarana: ProductId,
    pub sold_out: ProductId,
}

fn category(name: &str, is_pizza_category: bool, method: Option<PriceMethod>) -> MenuCategory {
    MenuCategory {
        id: CategoryId::generate(),
        name: name.to_string(),
        icon: "🍕".to_string(),
        position: 0,
        is_visible: true,
        is_promo: false,
        is_pizza_category,
        pizza_sizes: Vec::new(),
        pizza_price_method: method,
    }
}

fn product(category: &MenuCategory, name: &str, price: &str) -> MenuProduct {
    MenuProduct {
        id: ProductId::generate(),
        category_id: category.id,
        name: name.to_string(),
        description: None,
        price: money(price),
        image: None,
        position: 0,
        available: true,
        is_pizza_flavor: category.is_pizza_category,
    }
}

/// A small menu: savory pizzas priced by the restaurant default, sweet
/// pizzas overriding it with `average`, and drinks.
#[must_use]
pub fn menu() -> (Catalog, MenuIds) {
    let pizzas = category("Pizzas", true, None);
    let sweet = category("Pizzas Doces", true, Some(PriceMethod::Average));
    let drinks = category("Bebidas", false, None);

    let calabresa = product(&pizzas, "Calabresa", "42.00");
    let mussarela = product(&pizzas, "Mussarela", "38.00");
    let portuguesa = product(&pizzas, "Portuguesa", "47.90");
    let frango = product(&pizzas, "Frango com Catupiry", "45.00");
    let chocolate = product(&sweet, "Chocolate", "40.00");
    let banana = product(&sweet, "Banana com Canela", "35.00");
    let guarana = product(&drinks, "Guaraná 2L", "12.00");
    let mut sold_out = product(&drinks, "Suco de Caju", "9.00");
    sold_out.available = false;

    let ids = MenuIds {
        pizzas: pizzas.id,
        sweet_pizzas: sweet.id,
        drinks: drinks.id,
        calabresa: calabresa.id,
        mussarela: mussarela.id,
        portuguesa: portuguesa.id,
        frango: frango.id,
        chocolate: chocolate.id,
        banana: banana.id,
        guarana: guarana.id,
        sold_out: sold_out.id,
    };

    let catalog = Catalog {
        categories: vec![pizzas, sweet, drinks],
        products: vec![
            calabresa, mussarela, portuguesa, frango, chocolate, banana, guarana, sold_out,
        ],
    };

    (catalog, ids)
}
