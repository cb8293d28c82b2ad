use axum::{extract::State, Json};
use std::sync::Arc;

use crate::metrics::RefreshReport;
use crate::AppState;

use super::AppError;

// ─── POST /api/refresh ───────────────────────────────────────────
/// Asks the refresh loop for an immediate pass and waits for its result.
/// Refreshes never overlap: a request arriving while another one is
/// already queued gets 409.

pub async fn trigger_refresh(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshReport>, AppError> {
    let report = state.trigger.request().await?;
    Ok(Json(report))
}
