//! Delivery fee quotes.

use axum::{Json, extract::State};
use tracing::instrument;

use forno_core::{Coordinates, DeliveryQuote};

use crate::db::SettingsRepository;
use crate::error::Result;
use crate::state::AppState;

/// Quote delivery to the selected address.
///
/// `in_range: false` means checkout will be refused; clients use it to
/// disable submission early.
#[instrument(skip(state))]
pub async fn quote(
    State(state): State<AppState>,
    Json(destination): Json<Coordinates>,
) -> Result<Json<DeliveryQuote>> {
    let settings = SettingsRepository::new(state.pool()).get().await?;
    let quote = settings.quote_delivery(destination);

    tracing::debug!(
        distance_km = ?quote.distance_km,
        fee = %quote.fee,
        in_range = quote.in_range,
        "delivery quoted"
    );

    Ok(Json(quote))
}
