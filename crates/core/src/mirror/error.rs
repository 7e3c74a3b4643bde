//! Error types for the mirror module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a mirror operation.
///
/// Conditions the reconciler recovers from (missing sources, links that
/// already exist, album art failures) are logged instead, and a cross-volume
/// link is reported through [`SyncOutcome`](super::SyncOutcome).
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Failed to create a mirror directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to list a directory.
    #[error("Failed to read directory: {path}")]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to delete a file that is no longer targeted.
    #[error("Failed to remove stale link: {path}")]
    PruneFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a link that may not fail silently.
    #[error("Failed to link {from} to {to}")]
    LinkFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

impl MirrorError {
    pub fn link_failed(from: PathBuf, to: PathBuf, error: std::io::Error) -> Self {
        Self::LinkFailed { from, to, error }
    }
}
