use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use super::percentiles::PercentileSet;
use crate::log_window::WindowMode;

/// Outcome of one completed refresh.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub mode: WindowMode,
    pub refreshed_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub percentiles: PercentileSet,
}

/// Last refresh outcome, kept for the JSON snapshot endpoint.
/// The refresh loop calls `store()`, handlers call `latest()`.
#[derive(Default)]
pub struct SnapshotStore {
    inner: Mutex<Option<RefreshReport>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, report: RefreshReport) {
        *self.inner.lock() = Some(report);
    }

    /// `None` until the first refresh has finished.
    pub fn latest(&self) -> Option<RefreshReport> {
        self.inner.lock().clone()
    }
}
