//! Prometheus metrics for the HTTP server.
//!
//! HTTP request metrics live here; sync and fetch metrics come from
//! `vidcat_core::metrics` and are registered in the same registry.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use tracing::warn;

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "vidcat_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vidcat_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "vidcat_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Catalog Metrics (collected dynamically)
// =============================================================================

/// Channels in the persisted catalog.
pub static CATALOG_CHANNELS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("vidcat_catalog_channels", "Channels in the persisted catalog").unwrap()
});

/// Videos in the persisted catalog.
pub static CATALOG_VIDEOS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("vidcat_catalog_videos", "Videos in the persisted catalog").unwrap()
});

/// Whether a sync pass is running (1) or not (0).
pub static SYNC_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("vidcat_sync_running", "Whether a sync pass is running").unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let own: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        Box::new(CATALOG_CHANNELS.clone()),
        Box::new(CATALOG_VIDEOS.clone()),
        Box::new(SYNC_RUNNING.clone()),
    ];

    for metric in own.into_iter().chain(vidcat_core::metrics::all_metrics()) {
        if let Err(e) = registry.register(metric) {
            warn!(error = %e, "Failed to register metric");
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Update gauges from the current application state before encoding.
pub fn collect_dynamic_metrics(state: &AppState) {
    SYNC_RUNNING.set(i64::from(state.is_syncing()));

    if let Ok(registry) = state.registry() {
        let stats = state.store().load(&registry).stats();
        CATALOG_CHANNELS.set(stats.channels as i64);
        CATALOG_VIDEOS.set(stats.videos as i64);
    }
}
