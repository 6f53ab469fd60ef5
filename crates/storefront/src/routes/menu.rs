//! Customer menu.

use axum::{Json, extract::State};
use tracing::instrument;

use forno_core::menu::{MenuSection, customer_menu};

use crate::db::{MenuRepository, SettingsRepository};
use crate::error::Result;
use crate::state::AppState;

/// Visible categories, in order, each with its available products.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<MenuSection>>> {
    let settings = SettingsRepository::new(state.pool()).get().await?;
    let catalog = MenuRepository::new(state.pool()).catalog().await?;

    Ok(Json(customer_menu(
        &catalog.categories,
        &catalog.products,
        settings.pizza_price_method,
    )))
}
