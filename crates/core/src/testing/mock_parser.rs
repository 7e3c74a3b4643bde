//! Mock descriptor parser for testing.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::descriptor::{ChartDescriptor, DescriptorParser, ParseError};

/// Scriptable [`DescriptorParser`].
///
/// Files are identified by their stem. Unless a descriptor was registered for
/// a stem, `parse` returns one titled after the stem with assets named
/// `{stem}_art` and `{stem}_clip`. Every parsed path is recorded.
#[derive(Debug, Default)]
pub struct MockParser {
    descriptors: Mutex<HashMap<String, ChartDescriptor>>,
    failing: Mutex<HashSet<String>>,
    clip_durations: Mutex<HashMap<String, u32>>,
    parsed: Mutex<Vec<PathBuf>>,
}

impl MockParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `descriptor` when a file with this stem is parsed.
    pub fn set_descriptor(&self, stem: &str, descriptor: ChartDescriptor) {
        self.descriptors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(stem.to_string(), descriptor);
    }

    /// Make parsing the file with this stem fail.
    pub fn fail_on(&self, stem: &str) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(stem.to_string());
    }

    /// Clip length reported for a clip asset; other clips are "not found".
    pub fn set_clip_duration(&self, clip_asset_name: &str, seconds: u32) {
        self.clip_durations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(clip_asset_name.to_string(), seconds);
    }

    /// Paths passed to `parse`, in call order.
    pub fn parsed_paths(&self) -> Vec<PathBuf> {
        self.parsed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn parse_count(&self) -> usize {
        self.parsed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn clear_recorded(&self) {
        self.parsed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl DescriptorParser for MockParser {
    fn parse(&self, path: &Path) -> Result<ChartDescriptor, ParseError> {
        self.parsed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_path_buf());

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&stem)
        {
            return Err(ParseError::MissingEntry {
                path: path.to_path_buf(),
                key: "mock failure".to_string(),
            });
        }

        let registered = self
            .descriptors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&stem)
            .cloned();

        let mut descriptor = registered.unwrap_or_else(|| ChartDescriptor {
            title: stem.clone(),
            artist: "Mock Artist".to_string(),
            charter: "Mock Charter".to_string(),
            albumart_asset_name: format!("{stem}_art"),
            clip_asset_name: format!("{stem}_clip"),
            ..Default::default()
        });
        descriptor.source_path = path.to_path_buf();
        Ok(descriptor)
    }

    fn read_clip_metadata(&self, descriptor: &mut ChartDescriptor) -> Result<(), ParseError> {
        let seconds = self
            .clip_durations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&descriptor.clip_asset_name)
            .copied()
            .ok_or_else(|| ParseError::ClipNotFound {
                name: descriptor.clip_asset_name.clone(),
            })?;
        descriptor.clip_duration = Some(seconds);
        Ok(())
    }
}
