//! Directory layout shared by the custom charts folder and the mirror.

use std::io;
use std::path::{Path, PathBuf};

/// Extension of chart files.
pub const CHART_EXTENSION: &str = "srtb";
/// Subfolder holding album art images.
pub const ALBUM_ART_DIR: &str = "AlbumArt";
/// Subfolder holding audio clips.
pub const AUDIO_CLIPS_DIR: &str = "AudioClips";

/// Kind of file kept in the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Chart,
    AlbumArt,
    Clip,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Chart => "chart",
            AssetKind::AlbumArt => "album_art",
            AssetKind::Clip => "clip",
        }
    }
}

/// Paths inside a charts folder (either the source or the mirror).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartsLayout {
    root: PathBuf,
}

impl ChartsLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn album_art_dir(&self) -> PathBuf {
        self.root.join(ALBUM_ART_DIR)
    }

    pub fn audio_clips_dir(&self) -> PathBuf {
        self.root.join(AUDIO_CLIPS_DIR)
    }

    pub fn chart_path(&self, file_reference: &str) -> PathBuf {
        self.root.join(format!("{file_reference}.{CHART_EXTENSION}"))
    }

    /// Directory holding files of the given kind.
    pub fn dir_for(&self, kind: AssetKind) -> PathBuf {
        match kind {
            AssetKind::Chart => self.root.clone(),
            AssetKind::AlbumArt => self.album_art_dir(),
            AssetKind::Clip => self.audio_clips_dir(),
        }
    }
}

/// First regular file in `dir` (by name) whose stem is exactly `name`.
///
/// A missing directory is treated as empty.
pub fn find_asset(dir: &Path, name: &str) -> io::Result<Option<PathBuf>> {
    let mut matches: Vec<PathBuf> = list_files(dir)?
        .into_iter()
        .filter(|path| path.file_stem().is_some_and(|stem| stem == name))
        .collect();
    matches.sort();
    Ok(matches.into_iter().next())
}

/// Regular files directly inside `dir`. A missing directory is treated as empty.
pub fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

/// Chart files directly inside `dir`, sorted by name.
pub fn list_chart_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut charts: Vec<PathBuf> = list_files(dir)?
        .into_iter()
        .filter(|path| path.extension().is_some_and(|ext| ext == CHART_EXTENSION))
        .collect();
    charts.sort();
    Ok(charts)
}
