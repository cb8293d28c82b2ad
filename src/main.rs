use clap::Parser;
use std::future::IntoFuture;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod handlers;
mod log_window;
mod logging;
mod metrics;
mod middleware;
mod refresh;
mod server;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// Gauges scraped from `/metrics`; written only by the refresh loop.
    pub gauges: Arc<metrics::LatencyGauges>,

    /// Last refresh outcome for `/api/snapshot`.
    pub snapshots: Arc<metrics::SnapshotStore>,

    /// Queues an out-of-schedule refresh.
    pub trigger: refresh::RefreshTrigger,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = config::Args::parse();
    logging::init_logging(args.verbose);

    // ── 1. Metric registry ───────────────────────────────────────
    let gauges = match metrics::LatencyGauges::new() {
        Ok(gauges) => Arc::new(gauges),
        Err(err) => {
            error!(error = %err, "cannot register metrics");
            return ExitCode::FAILURE;
        }
    };
    let snapshots = Arc::new(metrics::SnapshotStore::new());

    // ── 2. Refresh loop ──────────────────────────────────────────
    let (trigger, queue) = refresh::trigger_channel();
    let refresher = refresh::Refresher::new(
        args.log_file.clone(),
        args.mode(),
        gauges.clone(),
        snapshots.clone(),
    );
    info!(
        log_file = %args.log_file.display(),
        mode = ?args.mode(),
        interval_secs = args.interval,
        "starting refresh loop"
    );
    let refresh_loop = refresh::run(refresher, args.refresh_period(), queue);

    // ── 3. Build shared state & router ───────────────────────────
    let state = Arc::new(AppState {
        gauges,
        snapshots,
        trigger,
    });
    let app = server::create_router(state);

    // ── 4. Bind & serve ──────────────────────────────────────────
    let addr = args.listen_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%addr, error = %err, "cannot bind metrics listener");
            return ExitCode::FAILURE;
        }
    };
    info!(%addr, "serving metrics on http://{addr}/metrics");

    // Whichever ends first decides the exit status.
    tokio::select! {
        result = refresh_loop => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!(error = %err, "refresh failed, shutting down");
                ExitCode::FAILURE
            }
        },
        result = axum::serve(listener, app).into_future() => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!(error = %err, "server exited with error");
                ExitCode::FAILURE
            }
        },
    }
}
