use axum::{extract::State, http::header, response::IntoResponse, Json};
use std::sync::Arc;

use super::collector::RefreshReport;
use crate::handlers::AppError;
use crate::AppState;

// ─── GET /metrics ────────────────────────────────────────────────
/// Prometheus scrape target. Serves whatever the last refresh published.

pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let body = state.gauges.encode()?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}

// ─── GET /api/snapshot ───────────────────────────────────────────
/// Last refresh as JSON, `null` before the first one finishes.
/// Useful for curl / debugging.

pub async fn get_snapshot(
    State(state): State<Arc<AppState>>,
) -> Json<Option<RefreshReport>> {
    Json(state.snapshots.latest())
}
