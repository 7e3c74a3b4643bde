//! Incremental chart indexer.
//!
//! Walks the custom charts folder and writes a record for every chart file
//! that is new or whose modification time changed since it was last indexed.
//! Unchanged files are neither parsed nor reported.

mod runner;
mod types;

pub use runner::{file_modified_at, Indexer, MODIFIED_AT_FORMAT};
pub use types::{IndexError, IndexSummary};
