//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Indexing (files indexed, skipped, failed; pass duration)
//! - Mirror sync (links created and pruned, aborted runs)
//! - Search (result sizes)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Indexer
// =============================================================================

/// Chart files seen by the indexer, by result.
pub static CHARTS_INDEXED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "chartlink_charts_indexed_total",
            "Chart files processed by the indexer",
        ),
        &["result"], // "indexed", "skipped", "failed"
    )
    .unwrap()
});

/// Duration of a full indexing pass.
pub static INDEX_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "chartlink_index_duration_seconds",
            "Duration of an indexing pass",
        )
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 300.0]),
    )
    .unwrap()
});

// =============================================================================
// Mirror
// =============================================================================

/// Links created in the mirror, by asset kind.
pub static LINKS_CREATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("chartlink_links_created_total", "Hard links created"),
        &["kind"], // "chart", "album_art", "clip"
    )
    .unwrap()
});

/// Stale links removed from the mirror, by asset kind.
pub static LINKS_PRUNED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("chartlink_links_pruned_total", "Stale hard links removed"),
        &["kind"],
    )
    .unwrap()
});

/// Sync runs stopped by a cross-volume link.
pub static SYNC_ABORTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "chartlink_sync_aborts_total",
        "Sync runs aborted because source and mirror are on different volumes",
    )
    .unwrap()
});

// =============================================================================
// Search
// =============================================================================

/// Number of charts returned per search.
pub static SEARCH_RESULTS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("chartlink_search_results", "Charts matched per search")
            .buckets(vec![0.0, 1.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0]),
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CHARTS_INDEXED.clone()),
        Box::new(INDEX_DURATION.clone()),
        Box::new(LINKS_CREATED.clone()),
        Box::new(LINKS_PRUNED.clone()),
        Box::new(SYNC_ABORTS.clone()),
        Box::new(SEARCH_RESULTS.clone()),
    ]
}
