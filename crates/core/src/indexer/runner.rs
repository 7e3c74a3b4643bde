//! Incremental indexing of a chart directory.

use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::types::{IndexError, IndexSummary};
use crate::catalog::{ChartRecord, ChartStore};
use crate::descriptor::DescriptorParser;
use crate::metrics;
use crate::mirror::list_chart_files;

/// Format of `file_modified_at`.
pub const MODIFIED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Modification time of `path` in UTC, at second resolution.
pub fn file_modified_at(path: &Path) -> std::io::Result<String> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(DateTime::<Utc>::from(modified)
        .format(MODIFIED_AT_FORMAT)
        .to_string())
}

/// Keeps a [`ChartStore`] in step with the chart files of a directory.
///
/// Only files whose modification time differs from the stored one are parsed.
pub struct Indexer<P: DescriptorParser> {
    parser: P,
    probe_clip_duration: bool,
}

impl<P: DescriptorParser> Indexer<P> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            probe_clip_duration: true,
        }
    }

    /// Whether to read clip lengths while indexing.
    pub fn with_clip_probe(mut self, enabled: bool) -> Self {
        self.probe_clip_duration = enabled;
        self
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Index every chart file directly inside `dir`.
    ///
    /// Files are visited in name order. `on_progress` receives the written
    /// record, the file's position and the number of files found; it is not
    /// called for skipped or failed files. Each record is committed as soon
    /// as it is written.
    pub fn index_directory<S, F>(
        &self,
        store: &S,
        dir: &Path,
        mut on_progress: F,
    ) -> Result<IndexSummary, IndexError>
    where
        S: ChartStore + ?Sized,
        F: FnMut(&ChartRecord, usize, usize),
    {
        let start = Instant::now();
        if !dir.is_dir() {
            return Err(IndexError::ReadDir {
                path: dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }
        let files = list_chart_files(dir).map_err(|e| IndexError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let total = files.len();
        let mut summary = IndexSummary {
            total,
            ..Default::default()
        };
        info!("Indexing {} chart files in {}", total, dir.display());

        for (idx, path) in files.iter().enumerate() {
            let Some(file_reference) = path.file_stem().map(|s| s.to_string_lossy().into_owned())
            else {
                continue;
            };

            let modified_at = match file_modified_at(path) {
                Ok(modified_at) => modified_at,
                Err(e) => {
                    warn!(%file_reference, "Failed to read modification time: {}", e);
                    summary.failed += 1;
                    metrics::CHARTS_INDEXED.with_label_values(&["failed"]).inc();
                    continue;
                }
            };

            if store.stored_modified_at(&file_reference)?.as_deref() == Some(modified_at.as_str()) {
                debug!(%file_reference, "Unchanged since last index, skipping");
                summary.skipped += 1;
                metrics::CHARTS_INDEXED.with_label_values(&["skipped"]).inc();
                continue;
            }

            let mut descriptor = match self.parser.parse(path) {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    error!(%file_reference, "Failed to parse chart: {}", e);
                    summary.failed += 1;
                    metrics::CHARTS_INDEXED.with_label_values(&["failed"]).inc();
                    continue;
                }
            };

            if self.probe_clip_duration {
                if let Err(e) = self.parser.read_clip_metadata(&mut descriptor) {
                    warn!(%file_reference, "Clip length unavailable: {}", e);
                }
            }

            let record = descriptor.to_record(file_reference, path, modified_at);
            store.upsert(&record)?;

            summary.indexed += 1;
            metrics::CHARTS_INDEXED.with_label_values(&["indexed"]).inc();
            on_progress(&record, idx, total);
        }

        metrics::INDEX_DURATION.observe(start.elapsed().as_secs_f64());
        info!(
            "Indexing finished: {} indexed, {} unchanged, {} failed",
            summary.indexed, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    /// Empty the store, then index `dir` from scratch.
    pub fn rebuild<S, F>(
        &self,
        store: &S,
        dir: &Path,
        on_progress: F,
    ) -> Result<IndexSummary, IndexError>
    where
        S: ChartStore + ?Sized,
        F: FnMut(&ChartRecord, usize, usize),
    {
        store.truncate()?;
        self.index_directory(store, dir, on_progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        CatalogStats, DifficultyTier, HardlinkTarget, SearchCondition, SqliteChartStore,
        StoreError,
    };
    use crate::descriptor::{ChartDescriptor, ChartDifficulty};
    use crate::testing::MockParser;
    use std::fs::File;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn write_charts(dir: &Path, stems: &[&str]) {
        for stem in stems {
            std::fs::write(dir.join(format!("{stem}.srtb")), b"{}").unwrap();
        }
    }

    fn bump_mtime(path: &Path, secs: u64) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn test_first_pass_indexes_everything() {
        let temp = TempDir::new().unwrap();
        write_charts(temp.path(), &["b", "a", "c"]);
        std::fs::write(temp.path().join("readme.txt"), b"ignored").unwrap();

        let store = SqliteChartStore::in_memory().unwrap();
        let indexer = Indexer::new(MockParser::new());

        let mut seen = Vec::new();
        let summary = indexer
            .index_directory(&store, temp.path(), |record, idx, total| {
                seen.push((record.file_reference.clone(), idx, total));
            })
            .unwrap();

        assert_eq!(
            summary,
            IndexSummary {
                total: 3,
                indexed: 3,
                skipped: 0,
                failed: 0
            }
        );
        assert_eq!(
            seen,
            vec![
                ("a".to_string(), 0, 3),
                ("b".to_string(), 1, 3),
                ("c".to_string(), 2, 3)
            ]
        );

        let record = store.get("a").unwrap().unwrap();
        assert_eq!(record.self_path, temp.path().join("a.srtb"));
        assert_eq!(
            record.file_modified_at,
            file_modified_at(&temp.path().join("a.srtb")).unwrap()
        );
    }

    #[test]
    fn test_second_pass_without_changes_does_nothing() {
        let temp = TempDir::new().unwrap();
        write_charts(temp.path(), &["a", "b"]);

        let store = SqliteChartStore::in_memory().unwrap();
        let indexer = Indexer::new(MockParser::new());
        indexer
            .index_directory(&store, temp.path(), |_, _, _| {})
            .unwrap();
        indexer.parser().clear_recorded();

        let mut callbacks = 0;
        let summary = indexer
            .index_directory(&store, temp.path(), |_, _, _| callbacks += 1)
            .unwrap();

        assert_eq!(summary.indexed, 0);
        assert_eq!(summary.skipped, 2);
        assert_eq!(callbacks, 0);
        assert_eq!(indexer.parser().parse_count(), 0);
    }

    #[test]
    fn test_changed_mtime_reindexes_only_that_file() {
        let temp = TempDir::new().unwrap();
        write_charts(temp.path(), &["a", "b", "c"]);

        let store = SqliteChartStore::in_memory().unwrap();
        let indexer = Indexer::new(MockParser::new());
        indexer
            .index_directory(&store, temp.path(), |_, _, _| {})
            .unwrap();
        indexer.parser().clear_recorded();

        bump_mtime(&temp.path().join("b.srtb"), 120);

        let mut written = Vec::new();
        let summary = indexer
            .index_directory(&store, temp.path(), |record, _, _| {
                written.push(record.file_reference.clone())
            })
            .unwrap();

        assert_eq!(written, vec!["b"]);
        assert_eq!(summary.indexed, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(
            indexer.parser().parsed_paths(),
            vec![temp.path().join("b.srtb")]
        );
        assert_eq!(
            store.stored_modified_at("b").unwrap().unwrap(),
            file_modified_at(&temp.path().join("b.srtb")).unwrap()
        );
    }

    #[test]
    fn test_parse_failure_does_not_stop_batch() {
        let temp = TempDir::new().unwrap();
        write_charts(temp.path(), &["bad", "good"]);

        let parser = MockParser::new();
        parser.fail_on("bad");
        let store = SqliteChartStore::in_memory().unwrap();
        let indexer = Indexer::new(parser);

        let summary = indexer
            .index_directory(&store, temp.path(), |_, _, _| {})
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.indexed, 1);
        assert!(store.get("bad").unwrap().is_none());
        assert!(store.get("good").unwrap().is_some());
    }

    #[test]
    fn test_clip_duration_and_difficulties_are_stored() {
        let temp = TempDir::new().unwrap();
        write_charts(temp.path(), &["song", "quiet"]);

        let parser = MockParser::new();
        let mut descriptor = ChartDescriptor::new("");
        descriptor.title = "Song".to_string();
        descriptor.clip_asset_name = "song_clip".to_string();
        descriptor.set_difficulty(DifficultyTier::Hard, ChartDifficulty::defined(7));
        descriptor.set_difficulty(
            DifficultyTier::Expert,
            ChartDifficulty {
                level: Some(9),
                is_defined: false,
            },
        );
        parser.set_descriptor("song", descriptor);
        parser.set_clip_duration("song_clip", 142);

        let store = SqliteChartStore::in_memory().unwrap();
        Indexer::new(parser)
            .index_directory(&store, temp.path(), |_, _, _| {})
            .unwrap();

        let song = store.get("song").unwrap().unwrap();
        assert_eq!(song.clip_duration, Some(142));
        assert_eq!(song.difficulty_levels.hard, Some(7));
        assert_eq!(song.difficulty_levels.expert, None);

        // No clip registered: still indexed, without a duration.
        let quiet = store.get("quiet").unwrap().unwrap();
        assert_eq!(quiet.clip_duration, None);

        let hard = SearchCondition::new().with_min_diff_level(5);
        assert_eq!(store.count(&hard).unwrap(), 1);
    }

    #[test]
    fn test_clip_probe_can_be_disabled() {
        let temp = TempDir::new().unwrap();
        write_charts(temp.path(), &["a"]);

        let parser = MockParser::new();
        parser.set_clip_duration("a_clip", 60);
        let store = SqliteChartStore::in_memory().unwrap();
        Indexer::new(parser)
            .with_clip_probe(false)
            .index_directory(&store, temp.path(), |_, _, _| {})
            .unwrap();

        assert_eq!(store.get("a").unwrap().unwrap().clip_duration, None);
    }

    #[test]
    fn test_rebuild_reparses_everything() {
        let temp = TempDir::new().unwrap();
        write_charts(temp.path(), &["a", "b"]);

        let store = SqliteChartStore::in_memory().unwrap();
        let indexer = Indexer::new(MockParser::new());
        indexer
            .index_directory(&store, temp.path(), |_, _, _| {})
            .unwrap();

        std::fs::remove_file(temp.path().join("b.srtb")).unwrap();
        let summary = indexer.rebuild(&store, temp.path(), |_, _, _| {}).unwrap();

        assert_eq!(summary.indexed, 1);
        assert!(store.get("b").unwrap().is_none());
        assert_eq!(store.stats().unwrap().total_charts, 1);
    }

    /// Store that reads like an empty index and rejects every write.
    struct ReadOnlyStore;

    impl ChartStore for ReadOnlyStore {
        fn upsert(&self, _record: &ChartRecord) -> Result<(), StoreError> {
            Err(StoreError::Database("disk full".to_string()))
        }

        fn truncate(&self) -> Result<(), StoreError> {
            Err(StoreError::Database("disk full".to_string()))
        }

        fn latest_index_timestamp(&self) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn search(&self, _condition: &SearchCondition) -> Result<Vec<HardlinkTarget>, StoreError> {
            Ok(Vec::new())
        }

        fn count(&self, _condition: &SearchCondition) -> Result<u64, StoreError> {
            Ok(0)
        }

        fn stored_modified_at(&self, _file_reference: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn get(&self, _file_reference: &str) -> Result<Option<ChartRecord>, StoreError> {
            Ok(None)
        }

        fn stats(&self) -> Result<CatalogStats, StoreError> {
            Ok(CatalogStats {
                total_charts: 0,
                latest_index_timestamp: None,
            })
        }
    }

    #[test]
    fn test_store_failure_stops_indexing() {
        let temp = TempDir::new().unwrap();
        write_charts(temp.path(), &["a", "b"]);
        let indexer = Indexer::new(MockParser::new());

        let mut callbacks = 0;
        let result =
            indexer.index_directory(&ReadOnlyStore, temp.path(), |_, _, _| callbacks += 1);

        match result {
            Err(IndexError::Store(StoreError::Database(message))) => {
                assert_eq!(message, "disk full");
            }
            other => panic!("expected a store error, got {other:?}"),
        }
        assert_eq!(callbacks, 0);
        // The batch stops at the first failed write.
        assert_eq!(indexer.parser().parse_count(), 1);

        let result = indexer.rebuild(&ReadOnlyStore, temp.path(), |_, _, _| {});
        assert!(matches!(result, Err(IndexError::Store(_))));
    }

    #[test]
    fn test_missing_directory_is_error() {
        let temp = TempDir::new().unwrap();
        let store = SqliteChartStore::in_memory().unwrap();
        let indexer = Indexer::new(MockParser::new());

        let result = indexer.index_directory(&store, &temp.path().join("nope"), |_, _, _| {});
        assert!(matches!(result, Err(IndexError::ReadDir { .. })));

        let file = temp.path().join("file.srtb");
        std::fs::write(&file, b"").unwrap();
        let result = indexer.index_directory(&store, &file, |_, _, _| {});
        assert!(matches!(result, Err(IndexError::ReadDir { .. })));
    }
}
