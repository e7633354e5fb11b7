use std::path::Path;

use crate::config::schema::AppConfig;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

/// Like [`load_config`], but a missing file yields the defaults rooted at
/// `data_dir`.
pub fn load_config_or_default<P: AsRef<Path>>(
    path: P,
    data_dir: &Path,
) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        log::debug!("No config at {}; using defaults", path.display());
        return Ok(AppConfig::with_data_dir(data_dir));
    }
    load_config(path)
}

pub fn load_config_from_str(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.search.timeout_secs == 0 || config.search.download_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "search timeouts must be at least one second".to_string(),
        });
    }

    if config.search.max_results == 0 {
        return Err(ConfigError::Validation {
            message: "search.max_results must be greater than zero".to_string(),
        });
    }

    if !config.search.endpoint.starts_with("http://")
        && !config.search.endpoint.starts_with("https://")
    {
        return Err(ConfigError::Validation {
            message: format!("Unsupported search endpoint: {}", config.search.endpoint),
        });
    }

    if config
        .photos
        .accepted_extensions
        .iter()
        .all(|e| e.trim_start_matches('.').trim().is_empty())
    {
        return Err(ConfigError::Validation {
            message: "photos.accepted_extensions must list at least one extension".to_string(),
        });
    }

    Ok(())
}
