//! Types for the indexer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::StoreError;

/// Counts from one indexing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    /// Chart files found in the directory.
    pub total: usize,
    /// Files parsed and written to the index.
    pub indexed: usize,
    /// Files whose stored modification time was current.
    pub skipped: usize,
    /// Files that could not be read or parsed.
    pub failed: usize,
}

/// Errors that stop an indexing pass.
///
/// Per-file problems are logged and counted in [`IndexSummary::failed`].
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Failed to list chart directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
