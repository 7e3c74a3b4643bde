//! Prometheus text exposition of the core metrics.

use anyhow::{Context, Result};
use prometheus::{Encoder, Registry, TextEncoder};

/// Registers every core metric in a fresh registry and encodes it as text.
pub fn encode_metrics() -> Result<String> {
    let registry = Registry::new();
    for metric in chartlink_core::metrics::all_metrics() {
        registry
            .register(metric)
            .context("Failed to register metric")?;
    }

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&registry.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_core_metrics() {
        chartlink_core::metrics::SYNC_ABORTS.inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("chartlink_sync_aborts_total"));
        assert!(text.contains("chartlink_index_duration_seconds"));
    }
}
