//! Chart index - one row per chart file found in the custom charts folder.
//!
//! The index lets searches run without re-reading chart files, and records
//! each file's modification time so unchanged files are skipped on the next
//! indexing pass.

mod query;
mod sqlite;
mod types;

pub use query::{SearchCondition, WhereClause};
pub use sqlite::SqliteChartStore;
pub use types::*;

/// Trait for chart index storage.
pub trait ChartStore: Send + Sync {
    /// Insert the record, or fully replace the one with the same `file_reference`.
    fn upsert(&self, record: &ChartRecord) -> Result<(), StoreError>;

    /// Delete every record in one transaction.
    fn truncate(&self) -> Result<(), StoreError>;

    /// Most recent write time across all records, shifted by the reporting
    /// offset. `None` when the index is empty.
    fn latest_index_timestamp(&self) -> Result<Option<String>, StoreError>;

    /// Mirror targets of every record matching the condition, in no particular order.
    fn search(&self, condition: &SearchCondition) -> Result<Vec<HardlinkTarget>, StoreError>;

    /// Number of records matching the condition.
    fn count(&self, condition: &SearchCondition) -> Result<u64, StoreError>;

    /// The `file_modified_at` stored for a chart, if it was indexed before.
    fn stored_modified_at(&self, file_reference: &str) -> Result<Option<String>, StoreError>;

    /// Get a full record by reference.
    fn get(&self, file_reference: &str) -> Result<Option<ChartRecord>, StoreError>;

    /// Get index statistics.
    fn stats(&self) -> Result<CatalogStats, StoreError>;
}
