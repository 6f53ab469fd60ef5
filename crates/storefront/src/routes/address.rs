//! Address autocomplete.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use forno_core::GeocodedAddress;

use crate::state::AppState;

/// Address search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Address suggestions for the checkout form.
///
/// Never fails: geocoder errors are logged and shown as no suggestions, so
/// the customer can keep typing.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<GeocodedAddress>> {
    match state.geocoder().search(&query.q).await {
        Ok(results) => Json(results),
        Err(e) => {
            tracing::warn!(error = %e, "address search failed");
            Json(Vec::new())
        }
    }
}
