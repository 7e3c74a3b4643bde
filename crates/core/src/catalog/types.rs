//! Types for the chart index.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// The five difficulty tiers a chart can define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    Easy,
    Normal,
    Hard,
    Expert,
    Xd,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 5] = [
        DifficultyTier::Easy,
        DifficultyTier::Normal,
        DifficultyTier::Hard,
        DifficultyTier::Expert,
        DifficultyTier::Xd,
    ];

    /// Column holding this tier's level in the `charts` table.
    pub fn column(self) -> &'static str {
        match self {
            DifficultyTier::Easy => "easy_difficulty",
            DifficultyTier::Normal => "normal_difficulty",
            DifficultyTier::Hard => "hard_difficulty",
            DifficultyTier::Expert => "expert_difficulty",
            DifficultyTier::Xd => "xd_difficulty",
        }
    }
}

/// Per-tier difficulty levels. `None` means the chart does not define the tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyLevels {
    pub easy: Option<u32>,
    pub normal: Option<u32>,
    pub hard: Option<u32>,
    pub expert: Option<u32>,
    pub xd: Option<u32>,
}

impl DifficultyLevels {
    pub fn get(&self, tier: DifficultyTier) -> Option<u32> {
        match tier {
            DifficultyTier::Easy => self.easy,
            DifficultyTier::Normal => self.normal,
            DifficultyTier::Hard => self.hard,
            DifficultyTier::Expert => self.expert,
            DifficultyTier::Xd => self.xd,
        }
    }

    pub fn set(&mut self, tier: DifficultyTier, level: Option<u32>) {
        let slot = match tier {
            DifficultyTier::Easy => &mut self.easy,
            DifficultyTier::Normal => &mut self.normal,
            DifficultyTier::Hard => &mut self.hard,
            DifficultyTier::Expert => &mut self.expert,
            DifficultyTier::Xd => &mut self.xd,
        };
        *slot = level;
    }
}

/// One indexed chart file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRecord {
    /// File stem of the chart; primary key.
    pub file_reference: String,
    pub track_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_subtitle: Option<String>,
    pub track_artist: String,
    pub charter: String,
    pub difficulty_levels: DifficultyLevels,
    /// Logical asset name, resolved against `AlbumArt/` at link time.
    pub albumart_asset_name: String,
    /// Logical asset name, resolved against `AudioClips/` at link time.
    pub clip_asset_name: String,
    /// Absolute path of the chart file when it was indexed.
    pub self_path: PathBuf,
    /// Clip length in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_duration: Option<u32>,
    /// Source modification time (`YYYY-MM-DD HH:MM:SS`, UTC) observed when written.
    pub file_modified_at: String,
    /// Set by the database on every write; `None` for records not yet stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ChartRecord {
    /// The mirror target this record maps to.
    pub fn hardlink_target(&self) -> HardlinkTarget {
        HardlinkTarget {
            file_reference: self.file_reference.clone(),
            albumart_asset_name: self.albumart_asset_name.clone(),
            clip_asset_name: self.clip_asset_name.clone(),
        }
    }
}

/// A chart that should exist in the mirror, with the assets it references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HardlinkTarget {
    pub file_reference: String,
    pub albumart_asset_name: String,
    pub clip_asset_name: String,
}

impl HardlinkTarget {
    pub fn new(
        file_reference: impl Into<String>,
        albumart_asset_name: impl Into<String>,
        clip_asset_name: impl Into<String>,
    ) -> Self {
        Self {
            file_reference: file_reference.into(),
            albumart_asset_name: albumart_asset_name.into(),
            clip_asset_name: clip_asset_name.into(),
        }
    }
}

/// Index statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Number of indexed charts.
    pub total_charts: u64,
    /// Latest write time, already shifted by the reporting offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_index_timestamp: Option<String>,
}

/// Errors for chart store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}
