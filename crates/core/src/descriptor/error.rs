//! Error types for the descriptor module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a chart file or its clip.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The chart file could not be read.
    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file (or one of its embedded values) is not the expected JSON.
    #[error("Malformed chart data in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A required entry is absent from the chart file.
    #[error("Missing entry {key} in {path}")]
    MissingEntry { path: PathBuf, key: String },

    /// No file in the clips folder matches the clip asset name.
    #[error("Clip asset not found: {name}")]
    ClipNotFound { name: String },

    /// The clip exists but its length could not be determined.
    #[error("Failed to probe clip {path}: {reason}")]
    ClipProbe { path: PathBuf, reason: String },
}

impl ParseError {
    pub fn clip_probe(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ClipProbe {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
