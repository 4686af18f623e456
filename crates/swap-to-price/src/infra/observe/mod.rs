use crate::domain::executor;

pub mod metrics;

pub fn swapped(outcome: &executor::Outcome) {
    metrics::get()
        .swaps
        .with_label_values(&[outcome.label()])
        .inc();
}

pub fn swap_error(err: &executor::Error) {
    metrics::get()
        .swap_errors
        .with_label_values(&[err.kind()])
        .inc();
}
