//! Restaurant settings and delivery zones.

use axum::{Json, extract::State};
use tracing::instrument;

use forno_core::{DeliverySettings, GeneralSettings, RestaurantSettings};

use crate::db::SettingsRepository;
use crate::error::Result;
use crate::state::AppState;

/// GET /api/settings
///
/// Full settings, Pix key included.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<RestaurantSettings>> {
    let settings = SettingsRepository::new(state.pool()).get().await?;
    Ok(Json(settings))
}

/// PUT /api/settings
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    Json(update): Json<GeneralSettings>,
) -> Result<Json<RestaurantSettings>> {
    let update = update.validate()?;
    let settings = SettingsRepository::new(state.pool())
        .update_general(&update)
        .await?;

    tracing::info!(is_open = settings.is_open, "settings updated");
    Ok(Json(settings))
}

/// PUT /api/settings/delivery
///
/// Zones are stored sorted by distance.
#[instrument(skip_all)]
pub async fn update_delivery(
    State(state): State<AppState>,
    Json(update): Json<DeliverySettings>,
) -> Result<Json<RestaurantSettings>> {
    let update = update.validate()?;
    let settings = SettingsRepository::new(state.pool())
        .update_delivery(&update)
        .await?;

    tracing::info!(
        zones = settings.delivery_zones.len(),
        zones_enabled = settings.delivery_zones_enabled(),
        "delivery settings updated"
    );
    Ok(Json(settings))
}
