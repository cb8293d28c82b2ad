use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::metrics::exposition;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── Scrape target ───────────────────────────────────────
        .route("/metrics", get(exposition::get_metrics))
        // ── Debug / control ─────────────────────────────────────
        .route("/api/snapshot", get(exposition::get_snapshot))
        .route("/api/refresh", post(handlers::refresh::trigger_refresh))
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        .layer(axum_mw::from_fn(timing::timing_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{LatencyGauges, SnapshotStore};
    use crate::refresh::trigger_channel;
    use reqwest::StatusCode;

    /// Serves the router on an ephemeral port with no refresh loop behind it.
    async fn spawn_server() -> String {
        let (trigger, queue) = trigger_channel();
        drop(queue);
        let app = create_router(Arc::new(AppState {
            gauges: Arc::new(LatencyGauges::new().unwrap()),
            snapshots: Arc::new(SnapshotStore::new()),
            trigger,
        }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    async fn get(url: String) -> reqwest::Response {
        client().get(url).send().await.unwrap()
    }

    #[tokio::test]
    async fn metrics_route_is_wired() {
        let base = spawn_server().await;
        let response = get(format!("{base}/metrics")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("server-timing"));
        let text = response.text().await.unwrap();
        assert!(text.contains("nginxrt_percentile_80 0"));
    }

    #[tokio::test]
    async fn snapshot_route_is_wired() {
        let base = spawn_server().await;
        let response = get(format!("{base}/api/snapshot")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "null");
    }

    #[tokio::test]
    async fn refresh_route_requires_post() {
        let base = spawn_server().await;
        let client = client();

        let response = client.get(format!("{base}/api/refresh")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = client.post(format!("{base}/api/refresh")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let base = spawn_server().await;
        let response = get(format!("{base}/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
