//! Metrics collection and exposition.
//!
//! # Metrics
//! - `forum_http_requests_total` (counter): requests by service, method, status
//! - `forum_http_request_duration_seconds` (histogram): latency by service, method
//! - `forum_proxy_upstream_errors_total` (counter): failed upstream calls by kind
//!
//! Without an installed recorder the macros are no-ops.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(service: &'static str, method: &str, status: u16, start: Instant) {
    counter!(
        "forum_http_requests_total",
        "service" => service,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "forum_http_request_duration_seconds",
        "service" => service,
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a failed upstream call from the edge proxy.
pub fn record_upstream_error(kind: &'static str) {
    counter!("forum_proxy_upstream_errors_total", "kind" => kind).increment(1);
}

/// Middleware timing every request that passes through a router.
pub async fn track_requests(
    State(service): State<&'static str>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let response = next.run(request).await;
    record_request(service, method.as_str(), response.status().as_u16(), start);
    response
}
