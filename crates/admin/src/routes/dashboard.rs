//! Dashboard headline numbers.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use forno_core::DashboardStats;

use crate::db::OrderRepository;
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Count orders placed from this instant; defaults to midnight UTC today.
    pub since: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub since: DateTime<Utc>,
    #[serde(flatten)]
    pub stats: DashboardStats,
}

/// GET /api/dashboard
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>> {
    let since = query.since.unwrap_or_else(|| start_of_day(Utc::now()));
    let orders = OrderRepository::new(state.pool()).placed_since(since).await?;

    Ok(Json(DashboardResponse {
        since,
        stats: DashboardStats::from_orders(&orders),
    }))
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}
