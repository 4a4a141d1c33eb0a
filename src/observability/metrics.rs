//! Metrics collection and exposition.
//!
//! # Metrics
//! - `filepress_upstream_requests_total` (counter): upstream calls by route, status
//! - `filepress_upstream_request_duration_seconds` (histogram): upstream latency
//!
//! # Design Decisions
//! - Recording is a no-op until the Prometheus recorder is installed
//! - Transport failures are labelled `status="error"`

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one upstream call. `status` is `None` when no response arrived.
pub fn record_upstream(route: &'static str, status: Option<u16>, start: Instant) {
    let status = status_label(status);
    metrics::counter!(
        "filepress_upstream_requests_total",
        "route" => route,
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "filepress_upstream_request_duration_seconds",
        "route" => route,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

fn status_label(status: Option<u16>) -> String {
    status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "error".to_string())
}
