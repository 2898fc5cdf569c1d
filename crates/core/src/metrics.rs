//! Prometheus metrics for sync passes and the fetch adapter.
//!
//! The server registers these through [`all_metrics`] and exposes them on
//! `/metrics`.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Sync passes
// =============================================================================

/// Sync passes total by result.
pub static SYNC_PASSES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vidcat_sync_passes_total", "Total sync passes"),
        &["result"], // "saved", "save_failed"
    )
    .unwrap()
});

/// Sync pass duration in seconds.
pub static SYNC_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("vidcat_sync_duration_seconds", "Duration of a sync pass")
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &[],
    )
    .unwrap()
});

/// Channel outcomes by category and status.
pub static CHANNEL_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "vidcat_channel_outcomes_total",
            "Per-channel sync outcomes",
        ),
        &["category", "status"], // status: "updated", "unchanged", "failed"
    )
    .unwrap()
});

/// New videos added to the catalog.
pub static VIDEOS_ADDED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vidcat_videos_added_total", "New videos added to the catalog"),
        &["category"],
    )
    .unwrap()
});

/// Videos dropped from the tail by the retention cap.
pub static VIDEOS_TRUNCATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "vidcat_videos_truncated_total",
        "Videos dropped by the retention cap",
    )
    .unwrap()
});

/// Fetched entries skipped because they could not become records.
pub static MALFORMED_ENTRIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "vidcat_malformed_entries_total",
        "Fetched entries skipped as malformed",
    )
    .unwrap()
});

// =============================================================================
// Fetch adapter
// =============================================================================

/// Channel listing duration by backend.
pub static FETCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "vidcat_fetch_duration_seconds",
            "Duration of a single channel listing",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["backend"],
    )
    .unwrap()
});

/// Channel listing failures by error kind.
pub static FETCH_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vidcat_fetch_errors_total", "Failed channel listings"),
        &["backend", "kind"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SYNC_PASSES.clone()),
        Box::new(SYNC_DURATION.clone()),
        Box::new(CHANNEL_OUTCOMES.clone()),
        Box::new(VIDEOS_ADDED.clone()),
        Box::new(VIDEOS_TRUNCATED.clone()),
        Box::new(MALFORMED_ENTRIES.clone()),
        Box::new(FETCH_DURATION.clone()),
        Box::new(FETCH_ERRORS.clone()),
    ]
}
