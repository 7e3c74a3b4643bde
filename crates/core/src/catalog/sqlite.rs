//! SQLite-backed chart index implementation.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{
    CatalogStats, ChartRecord, ChartStore, DifficultyLevels, HardlinkTarget, SearchCondition,
    StoreError,
};

const SELECT_RECORD_COLUMNS: &str = "file_reference, track_title, track_subtitle, track_artist, \
     charter, easy_difficulty, normal_difficulty, hard_difficulty, expert_difficulty, \
     xd_difficulty, albumart_asset_name, clip_asset_name, self_path, clip_duration, \
     file_modified_at, created_at";

/// SQLite-backed chart index.
///
/// The handle owns its connection; there is no process-wide state. Opening
/// a store creates the schema if needed, and creating it again is harmless.
pub struct SqliteChartStore {
    conn: Mutex<Connection>,
    report_offset_hours: i32,
}

impl SqliteChartStore {
    /// Open (or create) the index file at `path` and make sure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self::from_connection(conn);
        store.ensure_schema()?;
        info!("Chart index opened at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory index (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let store = Self::from_connection(Connection::open_in_memory()?);
        store.ensure_schema()?;
        Ok(store)
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            report_offset_hours: 0,
        }
    }

    /// Shift applied by [`ChartStore::latest_index_timestamp`].
    pub fn with_report_offset_hours(mut self, hours: i32) -> Self {
        self.report_offset_hours = hours;
        self
    }

    /// Create the `charts` table if it does not exist yet.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            -- One row per chart file, keyed by file stem
            CREATE TABLE IF NOT EXISTS charts (
                file_reference TEXT PRIMARY KEY,
                track_title TEXT NOT NULL,
                track_subtitle TEXT,
                track_artist TEXT NOT NULL,
                charter TEXT NOT NULL,
                easy_difficulty INTEGER,
                normal_difficulty INTEGER,
                hard_difficulty INTEGER,
                expert_difficulty INTEGER,
                xd_difficulty INTEGER,
                albumart_asset_name TEXT NOT NULL,
                clip_asset_name TEXT NOT NULL,
                self_path TEXT NOT NULL,
                clip_duration INTEGER,
                file_modified_at TEXT,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Internal("connection lock poisoned".to_string()))
    }

    fn offset_modifier(&self) -> String {
        format!("{:+} hours", self.report_offset_hours)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ChartRecord> {
        let self_path: String = row.get(12)?;
        Ok(ChartRecord {
            file_reference: row.get(0)?,
            track_title: row.get(1)?,
            track_subtitle: row.get(2)?,
            track_artist: row.get(3)?,
            charter: row.get(4)?,
            difficulty_levels: DifficultyLevels {
                easy: row.get(5)?,
                normal: row.get(6)?,
                hard: row.get(7)?,
                expert: row.get(8)?,
                xd: row.get(9)?,
            },
            albumart_asset_name: row.get(10)?,
            clip_asset_name: row.get(11)?,
            self_path: PathBuf::from(self_path),
            clip_duration: row.get(13)?,
            file_modified_at: row.get(14)?,
            created_at: row.get(15)?,
        })
    }
}

impl ChartStore for SqliteChartStore {
    fn upsert(&self, record: &ChartRecord) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let levels = &record.difficulty_levels;

        conn.execute(
            "INSERT OR REPLACE INTO charts (
                file_reference,
                track_title, track_subtitle, track_artist, charter,
                easy_difficulty, normal_difficulty, hard_difficulty,
                expert_difficulty, xd_difficulty, albumart_asset_name,
                clip_asset_name, self_path, clip_duration,
                file_modified_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                &record.file_reference,
                &record.track_title,
                &record.track_subtitle,
                &record.track_artist,
                &record.charter,
                levels.easy,
                levels.normal,
                levels.hard,
                levels.expert,
                levels.xd,
                &record.albumart_asset_name,
                &record.clip_asset_name,
                record.self_path.to_string_lossy().into_owned(),
                record.clip_duration,
                &record.file_modified_at,
            ],
        )?;

        debug!(file_reference = %record.file_reference, "Chart record written");
        Ok(())
    }

    fn truncate(&self) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM charts", [])?;
        tx.commit()?;

        info!("Chart index truncated ({} records removed)", removed);
        Ok(())
    }

    fn latest_index_timestamp(&self) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        let latest: Option<String> = conn.query_row(
            "SELECT datetime(MAX(created_at), ?) FROM charts",
            params![self.offset_modifier()],
            |row| row.get(0),
        )?;
        Ok(latest)
    }

    fn search(&self, condition: &SearchCondition) -> Result<Vec<HardlinkTarget>, StoreError> {
        let conn = self.lock()?;
        let clause = condition.to_where_clause();

        let sql = format!(
            "SELECT file_reference, albumart_asset_name, clip_asset_name FROM charts{}",
            clause.to_sql_suffix()
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(clause.params()), |row| {
            Ok(HardlinkTarget {
                file_reference: row.get(0)?,
                albumart_asset_name: row.get(1)?,
                clip_asset_name: row.get(2)?,
            })
        })?;

        let mut targets = Vec::new();
        for row in rows {
            targets.push(row?);
        }

        debug!("Search matched {} charts", targets.len());
        Ok(targets)
    }

    fn count(&self, condition: &SearchCondition) -> Result<u64, StoreError> {
        let conn = self.lock()?;
        let clause = condition.to_where_clause();

        let sql = format!("SELECT COUNT(*) FROM charts{}", clause.to_sql_suffix());
        let count: i64 =
            conn.query_row(&sql, params_from_iter(clause.params()), |row| row.get(0))?;
        Ok(count as u64)
    }

    fn stored_modified_at(&self, file_reference: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        let stored: Option<Option<String>> = conn
            .query_row(
                "SELECT file_modified_at FROM charts WHERE file_reference = ?",
                params![file_reference],
                |row| row.get(0),
            )
            .optional()?;
        Ok(stored.flatten())
    }

    fn get(&self, file_reference: &str) -> Result<Option<ChartRecord>, StoreError> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!("SELECT {SELECT_RECORD_COLUMNS} FROM charts WHERE file_reference = ?"),
                params![file_reference],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn stats(&self) -> Result<CatalogStats, StoreError> {
        let total: i64 = {
            let conn = self.lock()?;
            conn.query_row("SELECT COUNT(*) FROM charts", [], |row| row.get(0))?
        };

        Ok(CatalogStats {
            total_charts: total as u64,
            latest_index_timestamp: self.latest_index_timestamp()?,
        })
    }
}
