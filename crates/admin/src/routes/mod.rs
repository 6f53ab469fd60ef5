//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Orders
//! GET    /api/orders                  - Newest first (?status=, ?q=, ?limit=)
//! GET    /api/orders/events           - Server-sent order changes
//! GET    /api/orders/{id}             - One order
//! PATCH  /api/orders/{id}/status      - Advance to the next status
//!
//! # Dashboard
//! GET    /api/dashboard               - Today's statistics (?since=)
//!
//! # Settings
//! GET    /api/settings                - Full settings
//! PUT    /api/settings                - General settings
//! PUT    /api/settings/delivery       - Location and delivery zones
//!
//! # Menu
//! GET    /api/menu                    - All categories and products
//! POST   /api/menu/categories         - Create category
//! PUT    /api/menu/categories/{id}    - Update category
//! DELETE /api/menu/categories/{id}    - Delete category and its products
//! POST   /api/menu/products           - Create product
//! PUT    /api/menu/products/{id}      - Update product
//! DELETE /api/menu/products/{id}      - Delete product
//! ```

pub mod dashboard;
pub mod menu;
pub mod orders;
pub mod settings;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

/// Create the `/api` routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Orders
        .route("/orders", get(orders::index))
        .route("/orders/events", get(orders::events))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", patch(orders::update_status))
        // Dashboard
        .route("/dashboard", get(dashboard::show))
        // Settings
        .route("/settings", get(settings::show).put(settings::update))
        .route("/settings/delivery", put(settings::update_delivery))
        // Menu
        .route("/menu", get(menu::index))
        .route("/menu/categories", post(menu::create_category))
        .route(
            "/menu/categories/{id}",
            put(menu::update_category).delete(menu::delete_category),
        )
        .route("/menu/products", post(menu::create_product))
        .route(
            "/menu/products/{id}",
            put(menu::update_product).delete(menu::delete_product),
        )
}

/// Create all routes for the admin service.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}
