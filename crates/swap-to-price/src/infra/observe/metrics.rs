/// Metrics for the swap to price executor.
#[derive(Debug, Clone, prometheus_metric_storage::MetricStorage)]
pub struct Metrics {
    /// Successful calls, by whether a swap was executed.
    #[metric(labels("outcome"))]
    pub swaps: prometheus::IntCounterVec,

    /// Calls that were aborted.
    #[metric(labels("reason"))]
    pub swap_errors: prometheus::IntCounterVec,
}

/// Get the metrics instance.
pub fn get() -> &'static Metrics {
    Metrics::instance(observe::metrics::get_storage_registry())
        .expect("unexpected error getting metrics instance")
}
