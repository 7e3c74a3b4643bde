//! Spin Rhythm XD `.srtb` reader.
//!
//! An `.srtb` file is a JSON document whose interesting parts live in
//! `largeStringValuesContainer.values`: a list of `{ key, val }` entries where
//! `val` is itself a JSON document serialized to a string.

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, trace};

use super::clip::probe_clip_duration;
use super::error::ParseError;
use super::types::{ChartDescriptor, ChartDifficulty};
use super::DescriptorParser;
use crate::catalog::DifficultyTier;
use crate::mirror::{find_asset, AUDIO_CLIPS_DIR};

const TRACK_INFO_KEY: &str = "SO_TrackInfo_TrackInfo";
const TRACK_DATA_PREFIX: &str = "SO_TrackData_TrackData_";
const CLIP_INFO_KEY: &str = "SO_ClipInfo_ClipInfo_0";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SrtbFile {
    large_string_values_container: ValuesContainer,
}

#[derive(Debug, Deserialize)]
struct ValuesContainer {
    #[serde(default)]
    values: Vec<KeyedValue>,
}

#[derive(Debug, Deserialize)]
struct KeyedValue {
    key: String,
    val: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TrackInfo {
    title: String,
    subtitle: Option<String>,
    artist_name: String,
    charter: String,
    album_art_reference: AssetReference,
    difficulties: Vec<DeclaredDifficulty>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AssetReference {
    asset_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeclaredDifficulty {
    #[serde(rename = "_active", default = "default_active")]
    active: bool,
    difficulty_type: i64,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackData {
    difficulty_type: i64,
    #[serde(default)]
    difficulty_rating: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ClipInfo {
    clip_asset_reference: AssetReference,
}

fn tier_for_type(difficulty_type: i64) -> Option<DifficultyTier> {
    match difficulty_type {
        2 => Some(DifficultyTier::Easy),
        3 => Some(DifficultyTier::Normal),
        4 => Some(DifficultyTier::Hard),
        5 => Some(DifficultyTier::Expert),
        6 => Some(DifficultyTier::Xd),
        _ => None,
    }
}

/// Parser for `.srtb` chart files.
#[derive(Debug, Clone, Default)]
pub struct SrtbParser;

impl SrtbParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse chart data already read into memory. `path` is used for errors
    /// and recorded as the descriptor's source.
    pub fn parse_str(&self, path: &Path, contents: &str) -> Result<ChartDescriptor, ParseError> {
        let malformed = |source| ParseError::Malformed {
            path: path.to_path_buf(),
            source,
        };

        let file: SrtbFile = serde_json::from_str(contents).map_err(malformed)?;
        let values = file.large_string_values_container.values;

        let info_entry = values
            .iter()
            .find(|v| v.key == TRACK_INFO_KEY)
            .ok_or_else(|| ParseError::MissingEntry {
                path: path.to_path_buf(),
                key: TRACK_INFO_KEY.to_string(),
            })?;
        let info: TrackInfo = serde_json::from_str(&info_entry.val).map_err(malformed)?;

        let mut descriptor = ChartDescriptor::new(path);
        descriptor.title = info.title;
        descriptor.subtitle = info.subtitle.filter(|s| !s.trim().is_empty());
        descriptor.artist = info.artist_name;
        descriptor.charter = info.charter;
        descriptor.albumart_asset_name = info.album_art_reference.asset_name;

        for entry in values.iter().filter(|v| v.key.starts_with(TRACK_DATA_PREFIX)) {
            let data: TrackData = serde_json::from_str(&entry.val).map_err(malformed)?;
            let Some(tier) = tier_for_type(data.difficulty_type) else {
                trace!(key = %entry.key, "Ignoring unknown difficulty type {}", data.difficulty_type);
                continue;
            };

            let active = info
                .difficulties
                .iter()
                .find(|d| d.difficulty_type == data.difficulty_type)
                .is_none_or(|d| d.active);

            descriptor.set_difficulty(
                tier,
                ChartDifficulty {
                    level: data.difficulty_rating.and_then(|r| u32::try_from(r).ok()),
                    is_defined: active,
                },
            );
        }

        match values.iter().find(|v| v.key == CLIP_INFO_KEY) {
            Some(entry) => {
                let clip: ClipInfo = serde_json::from_str(&entry.val).map_err(malformed)?;
                descriptor.clip_asset_name = clip.clip_asset_reference.asset_name;
            }
            None => debug!("No clip entry in {}", path.display()),
        }

        Ok(descriptor)
    }
}

impl DescriptorParser for SrtbParser {
    fn parse(&self, path: &Path) -> Result<ChartDescriptor, ParseError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.parse_str(path, &contents)
    }

    fn read_clip_metadata(&self, descriptor: &mut ChartDescriptor) -> Result<(), ParseError> {
        let clips_dir = descriptor
            .source_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(AUDIO_CLIPS_DIR);

        let clip_path = find_asset(&clips_dir, &descriptor.clip_asset_name)
            .map_err(|e| ParseError::Io {
                path: clips_dir.clone(),
                source: e,
            })?
            .ok_or_else(|| ParseError::ClipNotFound {
                name: descriptor.clip_asset_name.clone(),
            })?;

        descriptor.clip_duration = Some(probe_clip_duration(&clip_path)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{
        mp3_clip, srtb_document, FIXTURE_CLIP_FRAMES, FIXTURE_CLIP_SECONDS,
    };

    #[test]
    fn test_parse_full_chart() {
        let doc = srtb_document(
            r#"{"title":"Song","subtitle":"Extended","artistName":"Artist","charter":"Me",
                "albumArtReference":{"assetName":"song_art"},
                "difficulties":[{"_active":true,"difficultyType":4},{"_active":true,"difficultyType":6}]}"#,
            &[
                r#"{"difficultyType":4,"difficultyRating":7}"#,
                r#"{"difficultyType":6,"difficultyRating":35}"#,
            ],
            Some(r#"{"clipAssetReference":{"assetName":"song_clip"}}"#),
        );

        let descriptor = SrtbParser::new()
            .parse_str(Path::new("/c/song.srtb"), &doc)
            .unwrap();

        assert_eq!(descriptor.title, "Song");
        assert_eq!(descriptor.subtitle.as_deref(), Some("Extended"));
        assert_eq!(descriptor.artist, "Artist");
        assert_eq!(descriptor.charter, "Me");
        assert_eq!(descriptor.albumart_asset_name, "song_art");
        assert_eq!(descriptor.clip_asset_name, "song_clip");
        assert_eq!(
            descriptor.difficulty(DifficultyTier::Hard),
            ChartDifficulty::defined(7)
        );
        assert_eq!(
            descriptor.difficulty(DifficultyTier::Xd),
            ChartDifficulty::defined(35)
        );
        assert!(!descriptor.difficulty(DifficultyTier::Easy).is_defined);
        assert_eq!(descriptor.clip_duration, None);
    }

    #[test]
    fn test_inactive_difficulty_is_undefined() {
        let doc = srtb_document(
            r#"{"title":"T","artistName":"A","charter":"C",
                "difficulties":[{"_active":false,"difficultyType":2}]}"#,
            &[r#"{"difficultyType":2,"difficultyRating":3}"#],
            None,
        );

        let descriptor = SrtbParser::new()
            .parse_str(Path::new("t.srtb"), &doc)
            .unwrap();

        let easy = descriptor.difficulty(DifficultyTier::Easy);
        assert!(!easy.is_defined);
        assert_eq!(descriptor.difficulty_levels().easy, None);
        assert_eq!(descriptor.clip_asset_name, "");
    }

    #[test]
    fn test_blank_subtitle_is_none() {
        let doc = srtb_document(r#"{"title":"T","subtitle":"  "}"#, &[], None);
        let descriptor = SrtbParser::new()
            .parse_str(Path::new("t.srtb"), &doc)
            .unwrap();
        assert!(descriptor.subtitle.is_none());
        assert_eq!(descriptor.artist, "");
    }

    #[test]
    fn test_missing_track_info() {
        let doc = r#"{"largeStringValuesContainer":{"values":[]}}"#;
        let result = SrtbParser::new().parse_str(Path::new("t.srtb"), doc);
        assert!(matches!(result, Err(ParseError::MissingEntry { .. })));
    }

    #[test]
    fn test_not_json() {
        let result = SrtbParser::new().parse_str(Path::new("t.srtb"), "not json");
        assert!(matches!(result, Err(ParseError::Malformed { .. })));
    }

    #[test]
    fn test_parse_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = SrtbParser::new().parse(&temp.path().join("nope.srtb"));
        assert!(matches!(result, Err(ParseError::Io { .. })));
    }

    #[test]
    fn test_read_clip_metadata_missing_clip() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(AUDIO_CLIPS_DIR)).unwrap();

        let mut descriptor = ChartDescriptor::new(temp.path().join("a.srtb"));
        descriptor.clip_asset_name = "absent".to_string();

        let result = SrtbParser::new().read_clip_metadata(&mut descriptor);
        assert!(matches!(result, Err(ParseError::ClipNotFound { .. })));
        assert_eq!(descriptor.clip_duration, None);
    }

    #[test]
    fn test_read_clip_metadata_unreadable_clip() {
        let temp = tempfile::TempDir::new().unwrap();
        let clips = temp.path().join(AUDIO_CLIPS_DIR);
        std::fs::create_dir(&clips).unwrap();
        std::fs::write(clips.join("garbage.ogg"), b"definitely not audio").unwrap();

        let mut descriptor = ChartDescriptor::new(temp.path().join("a.srtb"));
        descriptor.clip_asset_name = "garbage".to_string();

        let result = SrtbParser::new().read_clip_metadata(&mut descriptor);
        assert!(matches!(result, Err(ParseError::ClipProbe { .. })));
    }

    #[test]
    fn test_read_clip_metadata_sets_duration() {
        let temp = tempfile::TempDir::new().unwrap();
        let clips = temp.path().join(AUDIO_CLIPS_DIR);
        std::fs::create_dir(&clips).unwrap();
        std::fs::write(clips.join("song_clip.mp3"), mp3_clip(FIXTURE_CLIP_FRAMES)).unwrap();

        let mut descriptor = ChartDescriptor::new(temp.path().join("song.srtb"));
        descriptor.clip_asset_name = "song_clip".to_string();

        SrtbParser::new().read_clip_metadata(&mut descriptor).unwrap();
        assert_eq!(descriptor.clip_duration, Some(FIXTURE_CLIP_SECONDS));
    }
}
