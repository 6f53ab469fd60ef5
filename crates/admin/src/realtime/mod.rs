//! Realtime order change feed.
//!
//! ```text
//! orders (INSERT / UPDATE / DELETE)
//!       │ trigger: pg_notify('order_changes', {...})
//!       ▼
//! listener task (PgListener)
//!       │ OrderEvent
//!       ▼
//! OrderEventHub (broadcast)
//!       │
//!       ▼
//! GET /api/orders/events (one SSE stream per subscriber)
//! ```
//!
//! Events carry only the order ID and its new status. Clients refetch the
//! order list when one arrives.

use std::time::Duration;

use futures::Stream;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use forno_core::{OrderId, OrderStatus};

/// Notification channel the orders trigger publishes on.
pub const ORDER_CHANNEL: &str = "order_changes";

/// Broadcast capacity; enough to absorb a burst while a client reconnects.
const BROADCAST_CAPACITY: usize = 256;

const RECONNECT_DELAY_INITIAL: Duration = Duration::from_secs(1);
const RECONNECT_DELAY_MAX: Duration = Duration::from_secs(30);

/// What happened to the order row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderOperation {
    #[serde(alias = "INSERT")]
    Insert,
    #[serde(alias = "UPDATE")]
    Update,
    #[serde(alias = "DELETE")]
    Delete,
}

/// One change to the `orders` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub operation: OrderOperation,
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub total: Decimal,
}

impl OrderEvent {
    /// Parse a notification payload built by the orders trigger.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for a malformed payload.
    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// Fan-out of order events to every connected dashboard.
#[derive(Clone)]
pub struct OrderEventHub {
    tx: broadcast::Sender<OrderEvent>,
    closed: watch::Sender<bool>,
}

impl Default for OrderEventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderEventHub {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (closed, _) = watch::channel(false);
        Self { tx, closed }
    }

    /// End every open stream, e.g. on shutdown so SSE connections drain.
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    /// Send an event to current subscribers; returns how many received it.
    pub fn publish(&self, event: OrderEvent) -> usize {
        // send fails only when nobody is listening
        self.tx.send(event).unwrap_or(0)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }

    /// Events published from now on.
    ///
    /// A subscriber that falls behind skips the events it missed and keeps
    /// going. The stream ends when the hub is closed or dropped.
    pub fn stream(&self) -> impl Stream<Item = OrderEvent> + Send + 'static + use<> {
        let mut rx = self.subscribe();
        let mut closed = self.closed.subscribe();
        let already_closed = *closed.borrow();

        async_stream::stream! {
            if already_closed {
                return;
            }
            loop {
                tokio::select! {
                    biased;
                    // Only ever flips to true, so any change means closed
                    _ = closed.changed() => break,
                    received = rx.recv() => match received {
                        Ok(event) => yield event,
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "order event subscriber lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        }
    }
}

/// Forward database notifications to `hub` until the process exits.
///
/// Connection failures are retried with exponential backoff.
pub fn spawn_listener(pool: PgPool, hub: OrderEventHub) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut delay = RECONNECT_DELAY_INITIAL;

        loop {
            match listen(&pool, &hub).await {
                Ok(()) => delay = RECONNECT_DELAY_INITIAL,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        retry_in_secs = delay.as_secs(),
                        "order notification listener failed"
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(RECONNECT_DELAY_MAX);
                }
            }
        }
    })
}

/// Run one listener connection. Returns `Ok` only if the connection is
/// closed cleanly.
async fn listen(pool: &PgPool, hub: &OrderEventHub) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(ORDER_CHANNEL).await?;
    tracing::info!(channel = ORDER_CHANNEL, "listening for order changes");

    while let Some(notification) = listener.try_recv().await? {
        match OrderEvent::from_payload(notification.payload()) {
            Ok(event) => {
                let receivers = hub.publish(event.clone());
                tracing::debug!(
                    order_id = %event.order_id,
                    status = %event.status,
                    receivers,
                    "order event"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    payload = notification.payload(),
                    "ignoring malformed order notification"
                );
            }
        }
    }

    tracing::warn!("order notification connection closed");
    Ok(())
}
