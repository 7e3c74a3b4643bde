//! Types for the mirror module.

use serde::{Deserialize, Serialize};

/// Result of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// The run stopped early because of a cross-volume link.
    pub has_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Targets whose chart is linked (newly or already).
    pub success_creation_count: usize,
}

impl SyncOutcome {
    pub(crate) fn abort(&mut self, message: impl Into<String>) {
        self.has_error = true;
        self.error_message = Some(message.into());
    }
}

/// Files removed by a prune pass, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneSummary {
    pub charts: usize,
    pub album_art: usize,
    pub clips: usize,
}

impl PruneSummary {
    pub fn total(&self) -> usize {
        self.charts + self.album_art + self.clips
    }
}
