//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_requests_total` (counter): requests by method, status, operation
//! - `api_request_duration_seconds` (histogram): latency by method, operation
//! - `api_auth_failures_total` (counter): gate rejections by reason
//! - `api_session_events_total` (counter): issued, rotated, revoked sessions
//! - `api_sessions_active` (gauge): stored refresh sessions
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests and the
//!   CLI never need to set one up
//! - Unmatched requests are labelled `operation="none"` to keep cardinality
//!   bounded by the route table

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_metrics();
            tracing::info!(address = %addr, "Metrics endpoint listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
        }
    }
}

fn describe_metrics() {
    describe_counter!("api_requests_total", "Total number of dispatched requests");
    describe_histogram!("api_request_duration_seconds", "Request duration in seconds");
    describe_counter!("api_auth_failures_total", "Requests rejected by the auth gate");
    describe_counter!("api_session_events_total", "Session lifecycle events");
    describe_gauge!("api_sessions_active", "Refresh sessions currently stored");
}

/// Record one dispatched request.
pub fn record_request(method: &str, status: u16, operation: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("operation", operation.to_string()),
    ];
    counter!("api_requests_total", &labels).increment(1);
    histogram!(
        "api_request_duration_seconds",
        "method" => method.to_string(),
        "operation" => operation.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_auth_failure(reason: &'static str) {
    counter!("api_auth_failures_total", "reason" => reason).increment(1);
}

pub fn record_session_event(event: &'static str) {
    counter!("api_session_events_total", "event" => event).increment(1);
}

pub fn record_active_sessions(count: usize) {
    gauge!("api_sessions_active").set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_recorded_metrics_render() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_request("GET", 404, "none", Instant::now());
            record_auth_failure("expired");
            record_active_sessions(3);
        });

        let output = handle.render();
        assert!(output.contains("api_requests_total"));
        assert!(output.contains(r#"operation="none""#));
        assert!(output.contains(r#"reason="expired""#));
        assert!(output.contains("api_sessions_active"));
    }
}
