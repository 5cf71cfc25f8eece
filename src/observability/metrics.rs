//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by operation, status
//! - `relay_request_duration_seconds` (histogram): latency by operation
//! - `relay_upstream_failures_total` (counter): failures by operation, kind
//!
//! # Design Decisions
//! - Low-overhead updates (atomic operations)
//! - Prometheus exposition on a dedicated listener, off the serving path

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics exporter started");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter");
        }
    }
}

/// Record one completed relay operation.
pub fn record_relay(operation: &'static str, status: u16, started: Instant) {
    counter!(
        "relay_requests_total",
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("relay_request_duration_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());
}

/// Record one failed relay operation by failure kind.
pub fn record_failure(operation: &'static str, kind: &'static str) {
    counter!(
        "relay_upstream_failures_total",
        "operation" => operation,
        "kind" => kind
    )
    .increment(1);
}
