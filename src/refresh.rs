use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;
use tracing::{debug, info};

use crate::log_window::{read_window, select_window, LogReadError, WindowMode};
use crate::metrics::{LatencyGauges, PercentileSet, RefreshReport, SnapshotStore};

// ─── Errors ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Read(#[from] LogReadError),
    #[error("log read task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("a refresh is already queued")]
    Pending,
    #[error("refresh loop is not running")]
    Stopped,
    #[error("refresh failed: {0}")]
    Failed(String),
}

// ─── Refresher ───────────────────────────────────────────────────

/// One full pass: read the log window, collect samples, compute the
/// percentiles and publish them.
pub struct Refresher {
    log_path: PathBuf,
    mode: WindowMode,
    gauges: Arc<LatencyGauges>,
    snapshots: Arc<SnapshotStore>,
}

impl Refresher {
    pub fn new(
        log_path: PathBuf,
        mode: WindowMode,
        gauges: Arc<LatencyGauges>,
        snapshots: Arc<SnapshotStore>,
    ) -> Self {
        Self {
            log_path,
            mode,
            gauges,
            snapshots,
        }
    }

    /// Runs one refresh with `now` as the reference instant for the
    /// look-back horizon. A read failure leaves the gauges untouched.
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<RefreshReport, RefreshError> {
        let started = Instant::now();
        let path = self.log_path.clone();
        let mode = self.mode;

        // File reads and regex work stay off the async workers.
        let samples = tokio::task::spawn_blocking(move || {
            let text = read_window(&path, mode)?;
            Ok::<_, LogReadError>(select_window(&text, mode, now))
        })
        .await??;

        let percentiles = PercentileSet::from_samples(samples);
        if !percentiles.has_data() {
            debug!(path = %self.log_path.display(), "no requests in window, publishing zeros");
        }
        self.gauges.publish(&percentiles);

        let report = RefreshReport {
            mode,
            refreshed_at: now,
            elapsed_ms: started.elapsed().as_millis() as u64,
            percentiles,
        };
        info!(
            mode = ?report.mode,
            samples = report.percentiles.count,
            p80 = report.percentiles.p80,
            p90 = report.percentiles.p90,
            p95 = report.percentiles.p95,
            p98 = report.percentiles.p98,
            elapsed_ms = report.elapsed_ms,
            "latency percentiles refreshed"
        );

        self.snapshots.store(report.clone());
        Ok(report)
    }
}

// ─── External trigger ────────────────────────────────────────────

type TriggerOutcome = Result<RefreshReport, String>;
type TriggerReply = oneshot::Sender<TriggerOutcome>;

/// Handle used by HTTP handlers to ask the loop for an immediate refresh.
#[derive(Clone)]
pub struct RefreshTrigger {
    tx: mpsc::Sender<TriggerReply>,
}

/// Receiving half, consumed by [`run`].
pub struct TriggerQueue {
    rx: mpsc::Receiver<TriggerReply>,
}

/// At most one trigger waits while a refresh runs; more are rejected.
pub fn trigger_channel() -> (RefreshTrigger, TriggerQueue) {
    let (tx, rx) = mpsc::channel(1);
    (RefreshTrigger { tx }, TriggerQueue { rx })
}

impl RefreshTrigger {
    /// Queues a refresh without waiting for it.
    pub fn submit(&self) -> Result<oneshot::Receiver<TriggerOutcome>, TriggerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.try_send(reply_tx).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => TriggerError::Pending,
            mpsc::error::TrySendError::Closed(_) => TriggerError::Stopped,
        })?;
        Ok(reply_rx)
    }

    /// Queues a refresh and waits for its outcome.
    pub async fn request(&self) -> Result<RefreshReport, TriggerError> {
        let reply = self.submit()?;
        reply
            .await
            .map_err(|_| TriggerError::Stopped)?
            .map_err(TriggerError::Failed)
    }
}

// ─── Scheduler loop ──────────────────────────────────────────────

/// Refreshes once at start-up, then on every `period` tick and on every
/// queued trigger, strictly one at a time.
///
/// Returns only when a refresh fails: an unreadable log is fatal and the
/// caller is expected to log the error and exit. A trigger waiting on the
/// failed refresh gets its error reply first; the loop yields once so the
/// handler can answer before the process goes down, but a caller may still
/// see the connection close instead of the 500.
pub async fn run(
    refresher: Refresher,
    period: Duration,
    mut triggers: TriggerQueue,
) -> Result<(), RefreshError> {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ticks = IntervalStream::new(interval);

    loop {
        let reply = tokio::select! {
            Some(_) = ticks.next() => None,
            Some(reply) = triggers.rx.recv() => {
                debug!("refresh triggered externally");
                Some(reply)
            }
            else => return Ok(()),
        };

        match refresher.refresh(Utc::now()).await {
            Ok(report) => {
                if let Some(reply) = reply {
                    // Caller may have gone away; nothing to do then.
                    let _ = reply.send(Ok(report));
                }
            }
            Err(err) => {
                if let Some(reply) = reply {
                    let _ = reply.send(Err(err.to_string()));
                    tokio::task::yield_now().await;
                }
                return Err(err);
            }
        }
    }
}
