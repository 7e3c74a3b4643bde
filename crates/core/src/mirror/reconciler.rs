//! Hard link mirror reconciliation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use super::error::MirrorError;
use super::layout::{find_asset, list_chart_files, list_files, AssetKind, ChartsLayout};
use super::linker::{FsLinker, LinkOutcome, Linker};
use super::types::{PruneSummary, SyncOutcome};
use crate::catalog::HardlinkTarget;
use crate::metrics;

/// Reported when source and mirror live on different volumes.
pub const CROSS_VOLUME_MESSAGE: &str =
    "Hard links can only be created on the same volume; check the configured directories";

/// Keeps a mirror directory of hard links in step with a target set.
pub struct HardlinkMirror<L: Linker = FsLinker> {
    source: ChartsLayout,
    mirror: ChartsLayout,
    linker: L,
}

impl HardlinkMirror<FsLinker> {
    /// Creates a mirror of `source_dir` at `mirror_dir` using real hard links.
    pub fn new(source_dir: impl Into<PathBuf>, mirror_dir: impl Into<PathBuf>) -> Self {
        Self::with_linker(source_dir, mirror_dir, FsLinker)
    }
}

impl<L: Linker> HardlinkMirror<L> {
    pub fn with_linker(
        source_dir: impl Into<PathBuf>,
        mirror_dir: impl Into<PathBuf>,
        linker: L,
    ) -> Self {
        Self {
            source: ChartsLayout::new(source_dir),
            mirror: ChartsLayout::new(mirror_dir),
            linker,
        }
    }

    /// Make the mirror contain exactly the given targets.
    ///
    /// Stale files are pruned first. Then each target's chart is linked,
    /// followed by its album art (best effort) and clip. `on_each` receives
    /// `(index, total)` before each target is processed.
    pub fn reconcile<F>(
        &self,
        targets: &[HardlinkTarget],
        mut on_each: F,
    ) -> Result<SyncOutcome, MirrorError>
    where
        F: FnMut(usize, usize),
    {
        self.ensure_dirs()?;
        let pruned = self.prune(targets)?;
        debug!("Pruned {} stale files before linking", pruned.total());

        let total = targets.len();
        let mut outcome = SyncOutcome::default();

        for (idx, target) in targets.iter().enumerate() {
            on_each(idx, total);

            let from = self.source.chart_path(&target.file_reference);
            let to = self.mirror.chart_path(&target.file_reference);

            match LinkOutcome::classify(self.linker.hard_link(&from, &to)) {
                LinkOutcome::Created => {
                    metrics::LINKS_CREATED
                        .with_label_values(&[AssetKind::Chart.as_str()])
                        .inc();
                }
                LinkOutcome::AlreadyExists => {
                    debug!(file_reference = %target.file_reference, "Chart already linked");
                }
                LinkOutcome::SourceMissing => {
                    warn!(
                        file_reference = %target.file_reference,
                        "Source chart missing, skipping: {}",
                        from.display()
                    );
                    continue;
                }
                LinkOutcome::CrossDevice(e) => {
                    error!(
                        file_reference = %target.file_reference,
                        "Cannot link across volumes: {}",
                        e
                    );
                    metrics::SYNC_ABORTS.inc();
                    outcome.abort(CROSS_VOLUME_MESSAGE);
                    break;
                }
                LinkOutcome::Failed(e) => return Err(MirrorError::link_failed(from, to, e)),
            }

            self.link_album_art(target);
            self.link_clip(target)?;

            outcome.success_creation_count += 1;
        }

        info!(
            "Mirror sync finished: {}/{} targets linked{}",
            outcome.success_creation_count,
            total,
            if outcome.has_error { " (aborted)" } else { "" }
        );
        Ok(outcome)
    }

    /// Delete mirror files that no target refers to.
    ///
    /// Charts are matched on `file_reference`, album art and clips on their
    /// asset names. Only regular files are removed.
    pub fn prune(&self, targets: &[HardlinkTarget]) -> Result<PruneSummary, MirrorError> {
        let charts: HashSet<&str> = targets.iter().map(|t| t.file_reference.as_str()).collect();
        let album_art: HashSet<&str> = targets
            .iter()
            .map(|t| t.albumart_asset_name.as_str())
            .collect();
        let clips: HashSet<&str> = targets.iter().map(|t| t.clip_asset_name.as_str()).collect();

        let summary = PruneSummary {
            charts: self.prune_kind(AssetKind::Chart, &charts)?,
            album_art: self.prune_kind(AssetKind::AlbumArt, &album_art)?,
            clips: self.prune_kind(AssetKind::Clip, &clips)?,
        };

        if summary.total() > 0 {
            info!(
                "Removed {} stale links ({} charts, {} album art, {} clips)",
                summary.total(),
                summary.charts,
                summary.album_art,
                summary.clips
            );
        }
        Ok(summary)
    }

    /// Remove every chart, album art and clip file from the mirror.
    pub fn clear(&self) -> Result<PruneSummary, MirrorError> {
        self.prune(&[])
    }

    fn ensure_dirs(&self) -> Result<(), MirrorError> {
        for dir in [self.mirror.album_art_dir(), self.mirror.audio_clips_dir()] {
            std::fs::create_dir_all(&dir)
                .map_err(|e| MirrorError::DirectoryCreationFailed { path: dir, source: e })?;
        }
        Ok(())
    }

    fn prune_kind(&self, kind: AssetKind, keep: &HashSet<&str>) -> Result<usize, MirrorError> {
        let dir = self.mirror.dir_for(kind);
        let listed = match kind {
            AssetKind::Chart => list_chart_files(&dir),
            AssetKind::AlbumArt | AssetKind::Clip => list_files(&dir),
        };
        let files = listed.map_err(|e| MirrorError::ReadDirFailed {
            path: dir.clone(),
            source: e,
        })?;

        let mut removed = 0;
        for path in files {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if keep.contains(stem.as_str()) {
                continue;
            }

            self.linker.remove_link(&path).map_err(|e| MirrorError::PruneFailed {
                path: path.clone(),
                source: e,
            })?;
            debug!("Removed stale {}: {}", kind.as_str(), path.display());
            removed += 1;
        }

        metrics::LINKS_PRUNED
            .with_label_values(&[kind.as_str()])
            .inc_by(removed as u64);
        Ok(removed)
    }

    /// Resolve the asset in the source folder and link it under the same file name.
    fn link_asset(
        &self,
        kind: AssetKind,
        name: &str,
    ) -> Option<(PathBuf, PathBuf, std::io::Result<()>)> {
        let source_dir = self.source.dir_for(kind);
        let from = match find_asset(&source_dir, name) {
            Ok(Some(path)) => path,
            Ok(None) => {
                warn!("No {} file named {:?} in {}", kind.as_str(), name, source_dir.display());
                return None;
            }
            Err(e) => {
                warn!("Failed to list {}: {}", source_dir.display(), e);
                return None;
            }
        };

        let to = self.mirror.dir_for(kind).join(file_name(&from));
        let result = self.linker.hard_link(&from, &to);
        Some((from, to, result))
    }

    fn link_album_art(&self, target: &HardlinkTarget) {
        let Some((from, _to, result)) =
            self.link_asset(AssetKind::AlbumArt, &target.albumart_asset_name)
        else {
            return;
        };

        match LinkOutcome::classify(result) {
            LinkOutcome::Created => {
                metrics::LINKS_CREATED
                    .with_label_values(&[AssetKind::AlbumArt.as_str()])
                    .inc();
            }
            LinkOutcome::AlreadyExists => {}
            LinkOutcome::SourceMissing
            | LinkOutcome::CrossDevice(_)
            | LinkOutcome::Failed(_) => {
                warn!(
                    file_reference = %target.file_reference,
                    "Failed to link album art {}",
                    from.display()
                );
            }
        }
    }

    fn link_clip(&self, target: &HardlinkTarget) -> Result<(), MirrorError> {
        let Some((from, to, result)) = self.link_asset(AssetKind::Clip, &target.clip_asset_name)
        else {
            return Ok(());
        };

        match result {
            Ok(()) => {
                metrics::LINKS_CREATED
                    .with_label_values(&[AssetKind::Clip.as_str()])
                    .inc();
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(MirrorError::link_failed(from, to, e)),
        }
    }
}

fn file_name(path: &Path) -> &std::ffi::OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::write_source_chart;
    use crate::testing::MockLinker;
    use tempfile::TempDir;

    fn target(reference: &str) -> HardlinkTarget {
        HardlinkTarget::new(reference, format!("{reference}_art"), format!("{reference}_clip"))
    }

    fn setup(references: &[&str]) -> (TempDir, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("Custom");
        let mirror = temp.path().join("mirror");
        std::fs::create_dir_all(&source).unwrap();
        for reference in references {
            write_source_chart(
                &source,
                reference,
                &format!("{reference}_art"),
                &format!("{reference}_clip"),
            )
            .unwrap();
        }
        (temp, source, mirror)
    }

    fn mirror_stems(dir: &Path) -> Vec<String> {
        let mut stems: Vec<String> = list_files(dir)
            .unwrap()
            .iter()
            .map(|p| p.file_stem().unwrap().to_string_lossy().into_owned())
            .collect();
        stems.sort();
        stems
    }

    #[test]
    fn test_reconcile_links_all_assets() {
        let (_temp, source, mirror_dir) = setup(&["a"]);
        let mirror = HardlinkMirror::new(&source, &mirror_dir);

        let outcome = mirror.reconcile(&[target("a")], |_, _| {}).unwrap();

        assert_eq!(
            outcome,
            SyncOutcome {
                has_error: false,
                error_message: None,
                success_creation_count: 1,
            }
        );
        assert!(mirror_dir.join("a.srtb").is_file());
        assert!(mirror_dir.join("AlbumArt/a_art.png").is_file());
        assert!(mirror_dir.join("AudioClips/a_clip.mp3").is_file());
    }

    #[test]
    fn test_reconcile_converges_to_targets() {
        let (_temp, source, mirror_dir) = setup(&["A", "B", "C", "D"]);
        let mirror = HardlinkMirror::new(&source, &mirror_dir);

        mirror
            .reconcile(&[target("A"), target("B"), target("C")], |_, _| {})
            .unwrap();
        assert_eq!(mirror_stems(&mirror_dir), vec!["A", "B", "C"]);

        let outcome = mirror.reconcile(&[target("B"), target("D")], |_, _| {}).unwrap();

        assert!(!outcome.has_error);
        // B was already linked and still counts.
        assert_eq!(outcome.success_creation_count, 2);
        assert_eq!(mirror_stems(&mirror_dir), vec!["B", "D"]);
        assert_eq!(mirror_stems(&mirror_dir.join("AlbumArt")), vec!["B_art", "D_art"]);
        assert_eq!(mirror_stems(&mirror_dir.join("AudioClips")), vec!["B_clip", "D_clip"]);
    }

    #[test]
    fn test_progress_callback_sees_every_target() {
        let (_temp, source, mirror_dir) = setup(&["a", "b"]);
        let mirror = HardlinkMirror::new(&source, &mirror_dir);

        let mut calls = Vec::new();
        mirror
            .reconcile(&[target("a"), target("b")], |idx, total| calls.push((idx, total)))
            .unwrap();

        assert_eq!(calls, vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn test_missing_source_chart_is_skipped() {
        let (_temp, source, mirror_dir) = setup(&["a"]);
        let mirror = HardlinkMirror::new(&source, &mirror_dir);

        let outcome = mirror
            .reconcile(&[target("ghost"), target("a")], |_, _| {})
            .unwrap();

        assert!(!outcome.has_error);
        assert_eq!(outcome.success_creation_count, 1);
        assert!(!mirror_dir.join("ghost.srtb").exists());
        assert!(mirror_dir.join("a.srtb").exists());
    }

    #[test]
    fn test_missing_source_chart_skips_its_assets() {
        let (_temp, source, mirror_dir) = setup(&["a", "g"]);
        std::fs::remove_file(source.join("g.srtb")).unwrap();
        assert!(source.join("AlbumArt/g_art.png").is_file());
        assert!(source.join("AudioClips/g_clip.mp3").is_file());

        let mirror = HardlinkMirror::with_linker(&source, &mirror_dir, MockLinker::new());
        let outcome = mirror.reconcile(&[target("g")], |_, _| {}).unwrap();

        assert!(!outcome.has_error);
        assert_eq!(outcome.success_creation_count, 0);
        // Only the chart link was attempted.
        let destinations: Vec<PathBuf> = mirror
            .linker
            .calls()
            .into_iter()
            .map(|(_, to)| to)
            .collect();
        assert_eq!(destinations, vec![mirror_dir.join("g.srtb")]);
        assert!(mirror_stems(&mirror_dir.join("AlbumArt")).is_empty());
        assert!(mirror_stems(&mirror_dir.join("AudioClips")).is_empty());
    }

    #[test]
    fn test_prune_failure_propagates() {
        let (_temp, source, mirror_dir) = setup(&["a", "b"]);
        HardlinkMirror::new(&source, &mirror_dir)
            .reconcile(&[target("a"), target("b")], |_, _| {})
            .unwrap();

        let linker = MockLinker::new()
            .fail_removal_with_kind("a.srtb", std::io::ErrorKind::PermissionDenied);
        let mirror = HardlinkMirror::with_linker(&source, &mirror_dir, linker);

        let result = mirror.reconcile(&[target("b")], |_, _| {});
        match result {
            Err(MirrorError::PruneFailed { path, .. }) => {
                assert_eq!(path, mirror_dir.join("a.srtb"));
            }
            other => panic!("expected PruneFailed, got {other:?}"),
        }
        // Nothing was linked after the failed prune.
        assert!(mirror.linker.calls().is_empty());
        assert!(mirror_dir.join("a.srtb").exists());
    }

    #[test]
    fn test_cross_volume_aborts_after_pruning() {
        let (_temp, source, mirror_dir) = setup(&["A", "B", "C", "X"]);
        HardlinkMirror::new(&source, &mirror_dir)
            .reconcile(&[target("X")], |_, _| {})
            .unwrap();

        let linker = MockLinker::new().fail_with_os_error("B.srtb", 18);
        let mirror = HardlinkMirror::with_linker(&source, &mirror_dir, linker);

        let mut seen = Vec::new();
        let outcome = mirror
            .reconcile(&[target("A"), target("B"), target("C")], |idx, _| seen.push(idx))
            .unwrap();

        assert!(outcome.has_error);
        assert_eq!(outcome.error_message.as_deref(), Some(CROSS_VOLUME_MESSAGE));
        assert_eq!(outcome.success_creation_count, 1);
        // C is never attempted.
        assert_eq!(seen, vec![0, 1]);
        assert_eq!(mirror_stems(&mirror_dir), vec!["A"]);
    }

    #[test]
    fn test_unexpected_chart_link_error_propagates() {
        let (_temp, source, mirror_dir) = setup(&["a"]);
        let linker =
            MockLinker::new().fail_with_kind("a.srtb", std::io::ErrorKind::PermissionDenied);
        let mirror = HardlinkMirror::with_linker(&source, &mirror_dir, linker);

        let result = mirror.reconcile(&[target("a")], |_, _| {});
        assert!(matches!(result, Err(MirrorError::LinkFailed { .. })));
    }

    #[test]
    fn test_album_art_failure_is_ignored() {
        let (_temp, source, mirror_dir) = setup(&["a"]);
        let linker =
            MockLinker::new().fail_with_kind("a_art.png", std::io::ErrorKind::PermissionDenied);
        let mirror = HardlinkMirror::with_linker(&source, &mirror_dir, linker);

        let outcome = mirror.reconcile(&[target("a")], |_, _| {}).unwrap();

        assert_eq!(outcome.success_creation_count, 1);
        assert!(!mirror_dir.join("AlbumArt/a_art.png").exists());
        assert!(mirror_dir.join("AudioClips/a_clip.mp3").exists());
    }

    #[test]
    fn test_clip_failure_propagates() {
        let (_temp, source, mirror_dir) = setup(&["a"]);
        let linker =
            MockLinker::new().fail_with_kind("a_clip.mp3", std::io::ErrorKind::PermissionDenied);
        let mirror = HardlinkMirror::with_linker(&source, &mirror_dir, linker);

        let result = mirror.reconcile(&[target("a")], |_, _| {});
        assert!(matches!(result, Err(MirrorError::LinkFailed { .. })));
        // The chart link made before the failure stays.
        assert!(mirror_dir.join("a.srtb").exists());
    }

    #[test]
    fn test_missing_assets_only_warn() {
        let (_temp, source, mirror_dir) = setup(&[]);
        std::fs::write(source.join("bare.srtb"), b"{}").unwrap();
        let mirror = HardlinkMirror::new(&source, &mirror_dir);

        let outcome = mirror.reconcile(&[target("bare")], |_, _| {}).unwrap();
        assert_eq!(outcome.success_creation_count, 1);
        assert!(mirror_dir.join("bare.srtb").exists());
    }

    #[test]
    fn test_prune_leaves_directories_alone() {
        let (_temp, source, mirror_dir) = setup(&["a"]);
        let mirror = HardlinkMirror::new(&source, &mirror_dir);
        mirror.reconcile(&[target("a")], |_, _| {}).unwrap();
        std::fs::create_dir(mirror_dir.join("AudioClips/keep_me")).unwrap();

        let summary = mirror.prune(&[]).unwrap();

        assert_eq!(
            summary,
            PruneSummary {
                charts: 1,
                album_art: 1,
                clips: 1,
            }
        );
        assert!(mirror_dir.join("AudioClips/keep_me").is_dir());
    }

    #[test]
    fn test_clear_empties_mirror() {
        let (_temp, source, mirror_dir) = setup(&["a", "b"]);
        let mirror = HardlinkMirror::new(&source, &mirror_dir);
        mirror.reconcile(&[target("a"), target("b")], |_, _| {}).unwrap();

        let summary = mirror.clear().unwrap();

        assert_eq!(summary.total(), 6);
        assert!(mirror_stems(&mirror_dir).is_empty());
        assert!(mirror_stems(&mirror_dir.join("AlbumArt")).is_empty());
        // Source files are untouched.
        assert!(source.join("a.srtb").exists());
    }

    #[test]
    fn test_clear_on_missing_mirror() {
        let (_temp, source, mirror_dir) = setup(&[]);
        let summary = HardlinkMirror::new(&source, &mirror_dir).clear().unwrap();
        assert_eq!(summary.total(), 0);
    }
}
