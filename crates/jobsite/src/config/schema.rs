use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage::DEFAULT_PHOTO_EXTENSIONS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root for the database, uploads and downloaded manuals. Relative
    /// `db_file`, `uploads_dir` and `manuals_dir` resolve against it.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_db_file")]
    pub db_file: PathBuf,
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    #[serde(default = "default_manuals_dir")]
    pub manuals_dir: PathBuf,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub photos: PhotoConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
}

/// `~/.jobsite-buddy`, or `./.jobsite-buddy` when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".jobsite-buddy")
}

fn default_db_file() -> PathBuf {
    PathBuf::from("app_db.json")
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_manuals_dir() -> PathBuf {
    PathBuf::from("manuals")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_file: default_db_file(),
            uploads_dir: default_uploads_dir(),
            manuals_dir: default_manuals_dir(),
            search: SearchConfig::default(),
            photos: PhotoConfig::default(),
            ocr: OcrConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }

    pub fn uploads_path(&self) -> PathBuf {
        self.data_dir.join(&self.uploads_dir)
    }

    pub fn manuals_path(&self) -> PathBuf {
        self.data_dir.join(&self.manuals_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_endpoint() -> String {
    "https://duckduckgo.com/html/".to_string()
}

fn default_user_agent() -> String {
    format!("Mozilla/5.0 (ManualFinder/{}; jobsite)", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_download_timeout_secs() -> u64 {
    25
}

fn default_max_results() -> usize {
    8
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            download_timeout_secs: default_download_timeout_secs(),
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoConfig {
    #[serde(default = "default_extensions")]
    pub accepted_extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_PHOTO_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            accepted_extensions: default_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

fn default_languages() -> Vec<String> {
    vec!["eng".to_string()]
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            languages: default_languages(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_resolve_against_data_dir() {
        let config = AppConfig::with_data_dir("/srv/jobs");
        assert_eq!(config.db_path(), PathBuf::from("/srv/jobs/app_db.json"));
        assert_eq!(config.uploads_path(), PathBuf::from("/srv/jobs/uploads"));
        assert_eq!(config.manuals_path(), PathBuf::from("/srv/jobs/manuals"));
    }

    #[test]
    fn test_absolute_subpaths_win() {
        let mut config = AppConfig::with_data_dir("/srv/jobs");
        config.uploads_dir = PathBuf::from("/mnt/photos");
        assert_eq!(config.uploads_path(), PathBuf::from("/mnt/photos"));
    }

    #[test]
    fn test_default_data_dir_name() {
        assert!(default_data_dir().ends_with(".jobsite-buddy"));
    }
}
