//! Prometheus metrics for request latency and data access monitoring.
//!
//! This module provides metrics for:
//! - HTTP request latency
//! - Document store query latency and failures
//! - Records served per entity kind
//! - Wallet signing outcomes

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

use crate::error::StoreError;
use crate::record::EntityKind;

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Document store query latency metric name.
pub const METRIC_STORE_QUERY_LATENCY: &str = "store_query_latency_ms";
/// Records served counter metric name.
pub const METRIC_RECORDS_SERVED: &str = "records_served_total";
/// Store failures counter metric name.
pub const METRIC_STORE_FAILURES: &str = "store_failures_total";
/// Rejected HTTP methods counter metric name.
pub const METRIC_METHOD_NOT_ALLOWED: &str = "method_not_allowed_total";
/// Signing rejections counter metric name.
pub const METRIC_SIGNING_REJECTIONS: &str = "signing_rejections_total";
/// Signatures produced counter metric name.
pub const METRIC_SIGNATURES_PRODUCED: &str = "signatures_produced_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_histogram!(
        METRIC_STORE_QUERY_LATENCY,
        "Document store query latency in milliseconds"
    );

    describe_counter!(
        METRIC_RECORDS_SERVED,
        "Total number of records returned by the data access layer"
    );
    describe_counter!(
        METRIC_STORE_FAILURES,
        "Total number of document store failures"
    );
    describe_counter!(
        METRIC_METHOD_NOT_ALLOWED,
        "Total number of requests rejected for using a method other than GET"
    );
    describe_counter!(
        METRIC_SIGNING_REJECTIONS,
        "Total number of signing requests rejected by a disconnected wallet"
    );
    describe_counter!(
        METRIC_SIGNATURES_PRODUCED,
        "Total number of transactions signed"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Record HTTP request latency.
pub fn record_http_request_latency(start: Instant, route: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "route" => route).record(latency_ms);
}

/// Record document store query latency.
pub fn record_store_query_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_STORE_QUERY_LATENCY).record(latency_ms);
}

/// Record records returned for a kind.
pub fn record_records_served(kind: EntityKind, count: usize) {
    counter!(METRIC_RECORDS_SERVED, "entity" => kind.to_string()).increment(count as u64);
}

/// Record a document store failure.
pub fn record_store_failure(kind: EntityKind, error: &StoreError) {
    let reason = match error {
        StoreError::Unavailable { .. } => "unavailable",
        StoreError::QueryFailed { .. } => "query_failed",
        StoreError::NotConfigured => "not_configured",
    };
    counter!(METRIC_STORE_FAILURES, "entity" => kind.to_string(), "reason" => reason).increment(1);
}

/// Record a request rejected with 405.
pub fn record_method_not_allowed() {
    counter!(METRIC_METHOD_NOT_ALLOWED).increment(1);
}

/// Record a signing request rejected by a disconnected wallet.
pub fn record_signing_rejection() {
    counter!(METRIC_SIGNING_REJECTIONS).increment(1);
}

/// Record transactions signed.
pub fn record_signatures_produced(count: usize) {
    counter!(METRIC_SIGNATURES_PRODUCED).increment(count as u64);
}

/// Simple latency timer for measuring operation duration.
pub struct LatencyTimer {
    start: Instant,
    route: &'static str,
}

impl LatencyTimer {
    /// Start a timer for an HTTP route.
    pub fn http(route: &'static str) -> Self {
        Self {
            start: Instant::now(),
            route,
        }
    }

    /// Get elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_http_request_latency(self.start, self.route);
    }
}
