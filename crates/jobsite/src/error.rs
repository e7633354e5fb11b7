use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobsiteError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Rejected user input. Raised before any mutation takes place.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Type a site name first")]
    EmptySiteName,

    #[error("Item text cannot be empty")]
    EmptyItemText,

    #[error("Note text cannot be empty")]
    EmptyNote,

    #[error("Unknown list '{0}' (expected what_to_do, materials_need, materials_have or to_buy)")]
    UnknownList(String),

    #[error("Unknown photo section '{0}' (expected what_to_do, materials, to_buy, notes or general)")]
    UnknownSection(String),

    #[error("Unknown priority '{0}' (expected High, Medium or Low)")]
    UnknownPriority(String),

    #[error("Photo index {index} is out of range (bucket holds {len})")]
    PhotoIndexOutOfRange { index: usize, len: usize },

    #[error("Unsupported photo type '{0}'")]
    UnsupportedPhotoType(String),

    #[error("No site named '{0}'")]
    SiteNotFound(String),

    #[error("No item with id '{0}'")]
    ItemNotFound(String),

    #[error("Item id prefix '{0}' matches more than one item")]
    AmbiguousItemId(String),

    #[error("Select a site first")]
    NoSiteSelected,

    #[error("Search query cannot be empty")]
    EmptyQuery,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to replace '{to}' with '{from}': {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize database: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("File already exists: {0}")]
    FileExists(PathBuf),
}

/// Failures of the best-effort collaborators (manual search, downloads,
/// price sniffing, OCR). These never escape a `BestEffort` result.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("I/O error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("{0} is not available in this build")]
    Unavailable(&'static str),
}

pub type Result<T> = std::result::Result<T, JobsiteError>;
