//! Persisted "last used filter" so repeated syncs can reuse it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::ConfigError;
use crate::catalog::SearchCondition;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default)]
    filter: Option<SearchCondition>,
}

/// TOML file holding the most recently used search condition.
#[derive(Debug, Clone)]
pub struct FilterCache {
    path: PathBuf,
}

impl FilterCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached filter, or `None` if nothing was saved yet.
    pub fn load(&self) -> Result<Option<SearchCondition>, ConfigError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| ConfigError::ReadFailed {
                path: self.path.display().to_string(),
                source: e,
            })?;
        let file: CacheFile =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("Loaded filter cache from {}", self.path.display());
        Ok(file.filter)
    }

    pub fn save(&self, condition: &SearchCondition) -> Result<(), ConfigError> {
        let file = CacheFile {
            filter: Some(condition.clone()),
        };
        let contents =
            toml::to_string_pretty(&file).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(&self.path, contents).map_err(|e| ConfigError::WriteFailed {
            path: self.path.display().to_string(),
            source: e,
        })?;

        debug!("Saved filter cache to {}", self.path.display());
        Ok(())
    }
}
