//! Prometheus metrics for receivables-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

/// Counter for recorded payments by method.
pub static PAYMENTS_RECORDED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receivables_payments_recorded_total",
        "Total number of payments recorded",
        &["method"]
    )
    .expect("Failed to register PAYMENTS_RECORDED")
});

/// Counter for per-item reconciliation outcomes.
pub static RECONCILIATION_ITEMS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receivables_reconciliation_items_total",
        "Total number of batch items processed",
        &["outcome"]
    )
    .expect("Failed to register RECONCILIATION_ITEMS")
});

/// Counter for remittance batch confirmations.
pub static BATCHES_PROCESSED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receivables_batches_processed_total",
        "Total number of remittance batches confirmed",
        &["status"]
    )
    .expect("Failed to register BATCHES_PROCESSED")
});

/// Counter for exception resolutions by resolution type.
pub static EXCEPTION_RESOLUTIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receivables_exception_resolutions_total",
        "Total number of delivery exceptions resolved",
        &["resolution_type"]
    )
    .expect("Failed to register EXCEPTION_RESOLUTIONS")
});

/// Counter for best-effort collaborator sink failures.
pub static SINK_FAILURES: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receivables_sink_failures_total",
        "Total number of collaborator sink failures",
        &["sink"]
    )
    .expect("Failed to register SINK_FAILURES")
});

/// Counter for errors.
pub static ERRORS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receivables_errors_total",
        "Total number of errors",
        &["error_type"]
    )
    .expect("Failed to register ERRORS")
});

/// Histogram for store operation duration.
pub static STORE_OP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "receivables_store_op_duration_seconds",
        "Store operation duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register STORE_OP_DURATION")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&PAYMENTS_RECORDED);
    Lazy::force(&RECONCILIATION_ITEMS);
    Lazy::force(&BATCHES_PROCESSED);
    Lazy::force(&EXCEPTION_RESOLUTIONS);
    Lazy::force(&SINK_FAILURES);
    Lazy::force(&ERRORS);
    Lazy::force(&STORE_OP_DURATION);
}

/// Get all metrics as Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap_or_default();
    String::from_utf8(buffer).unwrap_or_default()
}

pub fn record_payment_recorded(method: &str) {
    PAYMENTS_RECORDED.with_label_values(&[method]).inc();
}

pub fn record_reconciliation_item(outcome: &str) {
    RECONCILIATION_ITEMS.with_label_values(&[outcome]).inc();
}

pub fn record_batch_processed(status: &str) {
    BATCHES_PROCESSED.with_label_values(&[status]).inc();
}

pub fn record_exception_resolution(resolution_type: &str) {
    EXCEPTION_RESOLUTIONS
        .with_label_values(&[resolution_type])
        .inc();
}

pub fn record_sink_failure(sink: &str) {
    SINK_FAILURES.with_label_values(&[sink]).inc();
}

pub fn record_error(error_type: &str) {
    ERRORS.with_label_values(&[error_type]).inc();
}
