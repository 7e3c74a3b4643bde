use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{
    types::{CacheConfig, Config, DatabaseConfig, IndexConfig, PathsConfig},
    ConfigError,
};

/// Mirror directory written into a freshly generated config, relative to the working directory.
const DEFAULT_HARDLINK_DIR: &str = "chart_hardlinks";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("CHARTLINK_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Write a default configuration file.
///
/// The mirror directory defaults to `./chart_hardlinks` (made absolute and
/// created). When `custom_charts_dir` is `None` the game's default location
/// is derived from `%APPDATA%`. An existing file is never overwritten.
pub fn write_default_config(
    path: &Path,
    custom_charts_dir: Option<PathBuf>,
) -> Result<Config, ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.display().to_string()));
    }

    let custom_charts_dir = match custom_charts_dir.or_else(default_custom_charts_dir) {
        Some(dir) => dir,
        None => {
            return Err(ConfigError::ValidationError(
                "no custom charts directory given and APPDATA is not set".to_string(),
            ))
        }
    };

    let hardlink_dir = std::path::absolute(DEFAULT_HARDLINK_DIR).map_err(|e| {
        ConfigError::WriteFailed {
            path: DEFAULT_HARDLINK_DIR.to_string(),
            source: e,
        }
    })?;
    std::fs::create_dir_all(&hardlink_dir).map_err(|e| ConfigError::WriteFailed {
        path: hardlink_dir.display().to_string(),
        source: e,
    })?;

    let config = Config {
        paths: PathsConfig {
            custom_charts_dir,
            hardlink_dir,
        },
        database: DatabaseConfig::default(),
        index: IndexConfig::default(),
        cache: CacheConfig::default(),
    };

    let contents =
        toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFailed {
        path: path.display().to_string(),
        source: e,
    })?;

    info!("Default config written to {}", path.display());
    Ok(config)
}

/// Default Spin Rhythm XD custom chart folder on Windows.
fn default_custom_charts_dir() -> Option<PathBuf> {
    let app_data = std::env::var_os("APPDATA")?;
    let local_low = PathBuf::from(app_data).parent()?.join("LocalLow");
    Some(
        local_low
            .join("Super Spin Digital")
            .join("Spin Rhythm XD")
            .join("Custom"),
    )
}
