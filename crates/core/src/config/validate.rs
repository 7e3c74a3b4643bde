use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Both directories are set, absolute and distinct
/// - The report offset stays within a day
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let paths = &config.paths;

    for (name, path) in [
        ("paths.custom_charts_dir", &paths.custom_charts_dir),
        ("paths.hardlink_dir", &paths.hardlink_dir),
    ] {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{name} cannot be empty"
            )));
        }
        if !path.is_absolute() {
            return Err(ConfigError::ValidationError(format!(
                "{name} must be an absolute path, got {}",
                path.display()
            )));
        }
    }

    if paths.custom_charts_dir == paths.hardlink_dir {
        return Err(ConfigError::ValidationError(
            "paths.hardlink_dir must differ from paths.custom_charts_dir".to_string(),
        ));
    }

    if !(-24..=24).contains(&config.index.report_offset_hours) {
        return Err(ConfigError::ValidationError(
            "index.report_offset_hours must be between -24 and 24".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheConfig, DatabaseConfig, IndexConfig, PathsConfig};
    use std::path::PathBuf;

    fn config_with_paths(charts: &str, links: &str) -> Config {
        Config {
            paths: PathsConfig {
                custom_charts_dir: PathBuf::from(charts),
                hardlink_dir: PathBuf::from(links),
            },
            database: DatabaseConfig::default(),
            index: IndexConfig::default(),
            cache: CacheConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        let config = config_with_paths("/srxd/Custom", "/srxd/links");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_relative_path_fails() {
        let config = config_with_paths("Custom", "/srxd/links");
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_same_directory_fails() {
        let config = config_with_paths("/srxd/Custom", "/srxd/Custom");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_offset_out_of_range_fails() {
        let mut config = config_with_paths("/srxd/Custom", "/srxd/links");
        config.index.report_offset_hours = 30;
        assert!(validate_config(&config).is_err());
    }
}
