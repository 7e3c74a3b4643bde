use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub paths: PathsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Source and mirror directories
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Directory the game reads custom charts from (`*.srtb`, `AlbumArt/`, `AudioClips/`).
    pub custom_charts_dir: PathBuf,
    /// Mirror root receiving hard links to the selected charts.
    pub hardlink_dir: PathBuf,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("charts.db")
}

/// Indexer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Offset (hours) applied to the latest index timestamp when reporting it.
    #[serde(default = "default_report_offset_hours")]
    pub report_offset_hours: i32,
    /// Whether to probe the clip audio for its length while indexing.
    #[serde(default = "default_true")]
    pub probe_clip_duration: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            report_offset_hours: default_report_offset_hours(),
            probe_clip_duration: true,
        }
    }
}

fn default_report_offset_hours() -> i32 {
    9
}

fn default_true() -> bool {
    true
}

/// Location of the last-used filter cache
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("cache.toml")
}
