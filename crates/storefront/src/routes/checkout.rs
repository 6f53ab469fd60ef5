//! Order placement.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use forno_core::{CheckoutForm, Coordinates, DeliveryQuote, Order, PixInstructions};

use crate::db::{MenuRepository, OrderRepository, SettingsRepository};
use crate::error::Result;
use crate::services::checkout::{CartLine, PricedCheckout, prepare_checkout};
use crate::state::AppState;

/// Checkout request: customer details, the chosen address and the cart.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub customer: CheckoutForm,
    /// Coordinates of the selected address suggestion.
    pub destination: Option<Coordinates>,
    pub items: Vec<CartLine>,
}

/// A placed order and how to pay for it.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: Order,
    pub delivery: DeliveryQuote,
    /// Present when paying by Pix and a key is configured.
    pub pix: Option<PixInstructions>,
}

/// Validate, reprice and store an order.
#[instrument(skip(state, request), fields(items = request.items.len()))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let settings = SettingsRepository::new(state.pool()).get().await?;
    let catalog = MenuRepository::new(state.pool()).catalog().await?;

    let PricedCheckout {
        order,
        delivery,
        pix,
    } = prepare_checkout(
        &settings,
        &catalog,
        &request.customer,
        &request.items,
        request.destination,
    )?;

    let order = OrderRepository::new(state.pool()).create(&order).await?;
    tracing::info!(
        order_id = %order.id,
        total = %order.total,
        payment_method = %order.payment_method,
        "order placed"
    );

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order,
            delivery,
            pix,
        }),
    ))
}
