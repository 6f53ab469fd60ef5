//! Multi-flavor pizza pricing.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use forno_core::pizza::PricedPizza;
use forno_core::{CategoryId, ProductId};

use crate::db::{MenuRepository, SettingsRepository};
use crate::error::Result;
use crate::services::checkout::price_pizza;
use crate::state::AppState;

/// Pizza price request.
#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    pub category_id: CategoryId,
    pub flavor_ids: Vec<ProductId>,
}

/// Price a pizza while the customer picks flavors.
#[instrument(skip(state))]
pub async fn price(
    State(state): State<AppState>,
    Json(request): Json<PriceRequest>,
) -> Result<Json<PricedPizza>> {
    let settings = SettingsRepository::new(state.pool()).get().await?;
    let catalog = MenuRepository::new(state.pool()).catalog().await?;

    let pizza = price_pizza(&catalog, &settings, request.category_id, &request.flavor_ids)?;
    Ok(Json(pizza))
}
