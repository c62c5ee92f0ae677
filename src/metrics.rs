// Metrics and observability module
// This file handles collection and reporting of ledger call latency,
// ledger errors and quote outcomes
//
// Numan Thabit 2025 Nov

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

pub static LEDGER_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "quoter_ledger_latency_seconds",
        "latency for ledger json-rpc calls",
        &["method"]
    )
    .unwrap()
});

pub static LEDGER_ERRORS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "quoter_ledger_errors_total",
        "ledger json-rpc failures",
        &["method"]
    )
    .unwrap()
});

pub static QUOTE_OUTCOMES: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "quoter_quote_outcomes_total",
        "quote requests by outcome",
        &["chain", "outcome"]
    )
    .unwrap()
});

/// Render the default registry in Prometheus text format.
pub fn render() -> String {
    let mut buf = Vec::new();
    if let Err(err) = TextEncoder::new().encode(&prometheus::gather(), &mut buf) {
        tracing::warn!(error = %err, "metrics encoding failed");
    }
    String::from_utf8(buf).unwrap_or_default()
}
