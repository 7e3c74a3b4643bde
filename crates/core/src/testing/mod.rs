//! Testing utilities and mock implementations.
//!
//! This module provides mocks for the parser and linker seams, so indexing
//! and mirror behavior can be tested without real chart files or without
//! real link failures.
//!
//! # Example
//!
//! ```rust,ignore
//! use chartlink_core::testing::{MockLinker, MockParser};
//!
//! let parser = MockParser::new();
//! parser.fail_on("broken");
//!
//! // Make the link for B.srtb fail with EXDEV
//! let linker = MockLinker::new().fail_with_os_error("B.srtb", 18);
//! ```

mod mock_linker;
mod mock_parser;

pub use mock_linker::MockLinker;
pub use mock_parser::MockParser;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::json;
    use std::io;
    use std::path::{Path, PathBuf};

    use crate::catalog::DifficultyTier;
    use crate::mirror::{ALBUM_ART_DIR, AUDIO_CLIPS_DIR, CHART_EXTENSION};

    fn difficulty_type(tier: DifficultyTier) -> i64 {
        match tier {
            DifficultyTier::Easy => 2,
            DifficultyTier::Normal => 3,
            DifficultyTier::Hard => 4,
            DifficultyTier::Expert => 5,
            DifficultyTier::Xd => 6,
        }
    }

    /// Wrap raw entry values into an `.srtb` document.
    ///
    /// `track_info` becomes the track info entry, each `track_data` item a
    /// numbered track data entry, and `clip_info` the first clip entry.
    pub fn srtb_document(track_info: &str, track_data: &[&str], clip_info: Option<&str>) -> String {
        let mut values = vec![json!({ "key": "SO_TrackInfo_TrackInfo", "val": track_info })];
        for (i, data) in track_data.iter().enumerate() {
            values.push(json!({ "key": format!("SO_TrackData_TrackData_{i}"), "val": data }));
        }
        if let Some(clip) = clip_info {
            values.push(json!({ "key": "SO_ClipInfo_ClipInfo_0", "val": clip }));
        }

        json!({
            "unityObjectValuesContainer": { "values": [] },
            "largeStringValuesContainer": { "values": values },
        })
        .to_string()
    }

    /// A complete `.srtb` document with the given metadata and difficulties.
    pub fn srtb_chart(
        title: &str,
        artist: &str,
        charter: &str,
        albumart_asset_name: &str,
        clip_asset_name: &str,
        difficulties: &[(DifficultyTier, u32)],
    ) -> String {
        let declared: Vec<_> = difficulties
            .iter()
            .map(|(tier, _)| json!({ "_active": true, "difficultyType": difficulty_type(*tier) }))
            .collect();
        let info = json!({
            "title": title,
            "artistName": artist,
            "charter": charter,
            "albumArtReference": { "assetName": albumart_asset_name },
            "difficulties": declared,
        })
        .to_string();

        let data: Vec<String> = difficulties
            .iter()
            .map(|(tier, rating)| {
                json!({ "difficultyType": difficulty_type(*tier), "difficultyRating": rating })
                    .to_string()
            })
            .collect();
        let data_refs: Vec<&str> = data.iter().map(String::as_str).collect();

        let clip = json!({ "clipAssetReference": { "assetName": clip_asset_name } }).to_string();

        srtb_document(&info, &data_refs, Some(&clip))
    }

    /// Frames in the clip written by [`write_source_chart`].
    pub const FIXTURE_CLIP_FRAMES: usize = 1000;

    /// Length in seconds of a clip of [`FIXTURE_CLIP_FRAMES`] frames.
    pub const FIXTURE_CLIP_SECONDS: u32 = 26;

    /// A silent MPEG-1 Layer III stream of `frames` frames.
    ///
    /// Every frame is 128 kbit/s, 44.1 kHz stereo, 1152 samples long and
    /// 417 bytes in size.
    pub fn mp3_clip(frames: usize) -> Vec<u8> {
        const HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
        const FRAME_LEN: usize = 417;

        let mut data = Vec::with_capacity(frames * FRAME_LEN);
        for _ in 0..frames {
            data.extend_from_slice(&HEADER);
            data.resize(data.len() + FRAME_LEN - HEADER.len(), 0);
        }
        data
    }

    /// Write a chart with its album art (`.png`) and clip (`.mp3`) under `root`.
    ///
    /// The album art is a placeholder; the clip is [`mp3_clip`] of
    /// [`FIXTURE_CLIP_FRAMES`] frames. Returns the chart path.
    pub fn write_source_chart(
        root: &Path,
        file_reference: &str,
        albumart_asset_name: &str,
        clip_asset_name: &str,
    ) -> io::Result<PathBuf> {
        let art_dir = root.join(ALBUM_ART_DIR);
        let clip_dir = root.join(AUDIO_CLIPS_DIR);
        std::fs::create_dir_all(&art_dir)?;
        std::fs::create_dir_all(&clip_dir)?;

        let chart_path = root.join(format!("{file_reference}.{CHART_EXTENSION}"));
        let contents = srtb_chart(
            file_reference,
            "Fixture Artist",
            "Fixture Charter",
            albumart_asset_name,
            clip_asset_name,
            &[(DifficultyTier::Normal, 5)],
        );
        std::fs::write(&chart_path, contents)?;
        std::fs::write(art_dir.join(format!("{albumart_asset_name}.png")), b"png")?;
        std::fs::write(
            clip_dir.join(format!("{clip_asset_name}.mp3")),
            mp3_clip(FIXTURE_CLIP_FRAMES),
        )?;

        Ok(chart_path)
    }
}
