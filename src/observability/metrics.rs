//! Metrics collection and exposition.
//!
//! # Metrics
//! - `faas_requests_total` (counter): dispatched requests by function, status
//! - `faas_request_duration_seconds` (histogram): dispatch latency by function
//! - `faas_backend_reachable` (gauge): 1 when the provider answered the last sync
//! - `faas_object_generation` (gauge): current generation per object
//!
//! Recording is a no-op until an exporter is installed.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter serving `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(function: &str, status: u16, start: Instant) {
    counter!(
        "faas_requests_total",
        "function" => function.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("faas_request_duration_seconds", "function" => function.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_backend_reachable(object: &str, reachable: bool) {
    gauge!("faas_backend_reachable", "object" => object.to_string())
        .set(if reachable { 1.0 } else { 0.0 });
}

pub fn record_generation(object: &str, generation: u64) {
    gauge!("faas_object_generation", "object" => object.to_string()).set(generation as f64);
}
