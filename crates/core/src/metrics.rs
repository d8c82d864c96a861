//! Prometheus metrics for the search and download paths.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

/// Searches executed, by mode.
pub static SEARCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trawler_searches_total", "Total searches executed"),
        &["mode"],
    )
    .unwrap()
});

/// Search duration in seconds, by mode.
pub static SEARCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("trawler_search_duration_seconds", "Duration of searches")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0]),
        &["mode"],
    )
    .unwrap()
});

/// Results returned per search, after dedup and limiting.
pub static SEARCH_RESULTS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "trawler_search_results",
            "Number of results returned per search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0]),
    )
    .unwrap()
});

/// Individual indexer failures during fan-out.
pub static INDEXER_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "trawler_indexer_errors_total",
        "Total per-indexer query failures",
    )
    .unwrap()
});

/// Download attempts, by method and result.
pub static DOWNLOAD_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trawler_download_attempts_total", "Total download attempts"),
        &["method", "result"],
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SEARCHES_TOTAL.clone()),
        Box::new(SEARCH_DURATION.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        Box::new(INDEXER_ERRORS.clone()),
        Box::new(DOWNLOAD_ATTEMPTS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
    }

    #[test]
    fn test_counters_increment() {
        SEARCHES_TOTAL.with_label_values(&["fast"]).inc();
        assert!(SEARCHES_TOTAL.with_label_values(&["fast"]).get() >= 1);
    }
}
