//! Metrics and observability utilities
//!
//! Metric descriptions and small recording helpers. Names share the
//! `folio_` prefix.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Folio metrics
pub const METRICS_PREFIX: &str = "folio";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.00,
];

/// Buckets for metadata generation, bounded by the 30s client timeout
pub const META_GENERATION_BUCKETS: &[f64] = &[
    0.100, 0.250, 0.500, 1.000, 2.000, 5.000, 10.00, 20.00, 30.00,
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_documents_uploaded_total", METRICS_PREFIX),
        Unit::Count,
        "Total documents uploaded"
    );

    describe_counter!(
        format!("{}_selections_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total selections created"
    );

    describe_counter!(
        format!("{}_meta_generation_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Metadata generation requests by outcome"
    );

    describe_histogram!(
        format!("{}_meta_generation_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Metadata generation latency in seconds"
    );

    describe_counter!(
        format!("{}_db_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total database errors"
    );

    describe_counter!(
        format!("{}_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total server errors returned"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

pub fn record_document_uploaded() {
    counter!(format!("{}_documents_uploaded_total", METRICS_PREFIX)).increment(1);
}

pub fn record_selections_created(count: usize) {
    counter!(format!("{}_selections_created_total", METRICS_PREFIX)).increment(count as u64);
}

/// `outcome` is one of `success`, `error` or `timeout`
pub fn record_meta_generation(duration_secs: f64, outcome: &str) {
    counter!(
        format!("{}_meta_generation_requests_total", METRICS_PREFIX),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(format!("{}_meta_generation_duration_seconds", METRICS_PREFIX))
        .record(duration_secs);
}

pub fn record_db_error() {
    counter!(format!("{}_db_errors_total", METRICS_PREFIX)).increment(1);
}
