//! Types for the descriptor module.

use std::path::{Path, PathBuf};

use crate::catalog::{ChartRecord, DifficultyLevels, DifficultyTier};

/// One difficulty tier as declared by a chart file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartDifficulty {
    pub level: Option<u32>,
    /// Whether the chart actually provides this tier.
    pub is_defined: bool,
}

impl ChartDifficulty {
    pub fn defined(level: u32) -> Self {
        Self {
            level: Some(level),
            is_defined: true,
        }
    }
}

/// Parsed contents of a chart file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartDescriptor {
    /// Path of the file the descriptor was read from.
    pub source_path: PathBuf,
    pub title: String,
    pub subtitle: Option<String>,
    pub artist: String,
    pub charter: String,
    /// Indexed in [`DifficultyTier::ALL`] order.
    pub difficulties: [ChartDifficulty; 5],
    pub albumart_asset_name: String,
    pub clip_asset_name: String,
    /// Clip length in seconds, once [`read_clip_metadata`] has run.
    ///
    /// [`read_clip_metadata`]: super::DescriptorParser::read_clip_metadata
    pub clip_duration: Option<u32>,
}

impl ChartDescriptor {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            ..Default::default()
        }
    }

    pub fn difficulty(&self, tier: DifficultyTier) -> ChartDifficulty {
        self.difficulties[tier_index(tier)]
    }

    pub fn set_difficulty(&mut self, tier: DifficultyTier, difficulty: ChartDifficulty) {
        self.difficulties[tier_index(tier)] = difficulty;
    }

    /// Levels of the defined tiers; undefined tiers stay empty.
    pub fn difficulty_levels(&self) -> DifficultyLevels {
        let mut levels = DifficultyLevels::default();
        for tier in DifficultyTier::ALL {
            let difficulty = self.difficulty(tier);
            if difficulty.is_defined {
                levels.set(tier, difficulty.level);
            }
        }
        levels
    }

    /// Builds the index record for this descriptor.
    pub fn to_record(
        &self,
        file_reference: impl Into<String>,
        self_path: &Path,
        file_modified_at: impl Into<String>,
    ) -> ChartRecord {
        ChartRecord {
            file_reference: file_reference.into(),
            track_title: self.title.clone(),
            track_subtitle: self.subtitle.clone(),
            track_artist: self.artist.clone(),
            charter: self.charter.clone(),
            difficulty_levels: self.difficulty_levels(),
            albumart_asset_name: self.albumart_asset_name.clone(),
            clip_asset_name: self.clip_asset_name.clone(),
            self_path: self_path.to_path_buf(),
            clip_duration: self.clip_duration,
            file_modified_at: file_modified_at.into(),
            created_at: None,
        }
    }
}

fn tier_index(tier: DifficultyTier) -> usize {
    match tier {
        DifficultyTier::Easy => 0,
        DifficultyTier::Normal => 1,
        DifficultyTier::Hard => 2,
        DifficultyTier::Expert => 3,
        DifficultyTier::Xd => 4,
    }
}
