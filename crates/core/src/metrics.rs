//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Pipeline runs (by mode and result)
//! - External services (text generation, publishing)
//! - Ledger resets

use std::time::Duration;

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Pipeline runs total by mode and result.
pub static PIPELINE_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("dailydose_pipeline_runs_total", "Total pipeline runs"),
        &["mode", "result"], // mode: "preview", "publish"; result: "success" or an error kind
    )
    .unwrap()
});

/// Pipeline run duration in seconds.
pub static PIPELINE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "dailydose_pipeline_duration_seconds",
            "Duration of a full pipeline run",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["mode"],
    )
    .unwrap()
});

/// Ledger resets performed by the reset exhaustion policy.
pub static LEDGER_RESETS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "dailydose_ledger_resets_total",
        "Times the publication ledger was reset after exhaustion",
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "dailydose_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "dailydose_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Record one external call.
pub fn record_external_call(service: &str, operation: &str, elapsed: Duration, ok: bool) {
    EXTERNAL_SERVICE_DURATION
        .with_label_values(&[service, operation])
        .observe(elapsed.as_secs_f64());
    EXTERNAL_SERVICE_REQUESTS
        .with_label_values(&[service, operation, if ok { "success" } else { "error" }])
        .inc();
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Pipeline
        Box::new(PIPELINE_RUNS.clone()),
        Box::new(PIPELINE_DURATION.clone()),
        Box::new(LEDGER_RESETS.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
    ]
}
