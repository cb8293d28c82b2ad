use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::debug;

/// Tower-compatible middleware that adds a `Server-Timing` response header
/// and logs one line per request at debug level.
///
/// Scrapes hit `/metrics` every few seconds, so this stays quiet at the
/// default `info` level.
pub async fn timing_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let start = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = start.elapsed();

    let server_timing = format!("total;dur={:.3}", elapsed.as_secs_f64() * 1000.0);
    if let Ok(val) = server_timing.parse() {
        response.headers_mut().insert("Server-Timing", val);
    }

    debug!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_us = elapsed.as_micros() as u64,
        "served request"
    );

    response
}
