//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define router metrics (renders, latency, reconciliation, module loads)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `stack_renders_total` (counter): renders by kind (document, stack) and status
//! - `stack_render_duration_seconds` (histogram): time until the response is committed
//! - `stack_reconciled_changes_total` (counter): applied file changes by event kind
//! - `stack_module_loads_total` (counter): module resolutions by cache outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op (tests, embedding)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished render decision.
pub fn record_render(kind: &'static str, status: u16, start: Instant) {
    metrics::counter!("stack_renders_total", "kind" => kind, "status" => status.to_string())
        .increment(1);
    metrics::histogram!("stack_render_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

/// Record one applied file change.
pub fn record_reconciled_change(event: &'static str) {
    metrics::counter!("stack_reconciled_changes_total", "event" => event).increment(1);
}

/// Record a module resolution (`hit` or `miss`).
pub fn record_module_load(cache: &'static str) {
    metrics::counter!("stack_module_loads_total", "cache" => cache).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_render("document", 200, Instant::now());
        record_reconciled_change("add");
        record_module_load("hit");
    }
}
