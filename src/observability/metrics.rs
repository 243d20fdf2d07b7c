//! Metrics collection and exposition.
//!
//! # Metrics
//! - `webhook_requests_total` (counter): inbound calls by transport, input type, status
//! - `webhook_request_duration_seconds` (histogram): end-to-end latency
//! - `webhook_deliveries_total` (counter): delivery attempts by destination, status
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels are low-cardinality: input types and adapters come from config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics recorder"),
    }
}

/// Record one inbound webhook call.
pub fn record_request(transport: &'static str, input_type: &str, status: u16, start: Instant) {
    metrics::counter!(
        "webhook_requests_total",
        "transport" => transport,
        "input_type" => input_type.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("webhook_request_duration_seconds", "transport" => transport)
        .record(start.elapsed().as_secs_f64());
}

/// Record one delivery attempt.
pub fn record_delivery(destination: &str, status: u16) {
    metrics::counter!(
        "webhook_deliveries_total",
        "destination" => destination.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
