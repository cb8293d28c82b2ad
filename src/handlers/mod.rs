pub mod refresh;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::metrics::MetricsError;
use crate::refresh::TriggerError;

// ─── Unified error type ──────────────────────────────────────────

#[derive(Debug)]
pub enum AppError {
    Metrics(String),
    RefreshPending,
    RefreshStopped,
    RefreshFailed(String),
}

impl From<MetricsError> for AppError {
    fn from(err: MetricsError) -> Self {
        Self::Metrics(err.to_string())
    }
}

impl From<TriggerError> for AppError {
    fn from(err: TriggerError) -> Self {
        match err {
            TriggerError::Pending => Self::RefreshPending,
            TriggerError::Stopped => Self::RefreshStopped,
            TriggerError::Failed(msg) => Self::RefreshFailed(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Metrics(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Metrics: {msg}"))
            }
            Self::RefreshPending => {
                (StatusCode::CONFLICT, "Refresh already queued".into())
            }
            Self::RefreshStopped => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Refresh loop is not running".into(),
            ),
            Self::RefreshFailed(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Refresh: {msg}"))
            }
        };

        let body = serde_json::json!({
            "error":  message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
