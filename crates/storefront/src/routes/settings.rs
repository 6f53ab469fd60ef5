//! Public restaurant settings.

use axum::{Json, extract::State};
use tracing::instrument;

use forno_core::settings::PublicSettings;

use crate::db::SettingsRepository;
use crate::error::Result;
use crate::state::AppState;

/// Restaurant name, hours, payment methods and delivery mode.
///
/// The Pix key itself is only revealed after checkout.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<PublicSettings>> {
    let settings = SettingsRepository::new(state.pool()).get().await?;
    Ok(Json(PublicSettings::from(&settings)))
}
