//! Order board: listing, status changes and the live change feed.

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::instrument;

use forno_core::{Order, OrderId, OrderStatus};

use crate::db::{OrderFilter, OrderRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters for the order listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    /// Customer name or phone.
    pub q: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/orders
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>> {
    let filter = OrderFilter {
        status: query.status,
        search: query.q,
        since: None,
        limit: query.limit,
    };
    let orders = OrderRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
#[instrument(skip(state), fields(order_id = %id))]
pub async fn show(State(state): State<AppState>, Path(id): Path<OrderId>) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

/// Body of a status change.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// PATCH /api/orders/{id}/status
///
/// Only the next step in the lifecycle is accepted.
#[instrument(skip(state, update), fields(order_id = %id, to = %update.status))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Order>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if !order.status.can_transition_to(update.status) {
        return Err(AppError::InvalidTransition {
            from: order.status,
            to: update.status,
        });
    }

    let updated = repo.update_status(id, order.status, update.status).await?;
    tracing::info!(from = %order.status, to = %updated.status, "order status changed");

    Ok(Json(updated))
}

/// GET /api/orders/events
///
/// Server-sent `order` events, one per change to the orders table.
#[instrument(skip(state))]
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let sse_stream = state.events().stream().map(|event| {
        let json = serde_json::to_string(&event)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize event"}"#.to_string());
        Ok(Event::default().event("order").data(json))
    });

    Sse::new(sse_stream).keep_alive(KeepAlive::default())
}
