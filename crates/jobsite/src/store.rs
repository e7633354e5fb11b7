//! Persistence gateway for the database document.
//!
//! The whole document lives in one pretty-printed JSON file and is rewritten
//! in full on every save (write to a sibling temp file, then rename). There is
//! no locking; a single process is assumed to own the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::StorageError;
use crate::migration::{migrate, MigrationReport};
use crate::model::Database;
use crate::sanitize::redact_path;

/// What was found on disk before migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredState {
    Missing,
    /// Present but unreadable or not valid JSON. Replaced by a fresh document.
    Unreadable,
    Loaded,
}

pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads, migrates and immediately persists the document. Missing or
    /// corrupted storage yields a fresh empty database. Only a failure to
    /// write the result is reported.
    pub fn load(&self) -> Result<Database, StorageError> {
        self.load_with_report().map(|(db, _, _)| db)
    }

    pub fn load_with_report(&self) -> Result<(Database, StoredState, MigrationReport), StorageError> {
        let _span = tracing::info_span!("store.load", file = %redact_path(&self.path)).entered();

        let (state, raw) = self.read_raw();
        let (db, report) = migrate(raw);
        self.save(&db)?;

        log::debug!(
            "Loaded database ({:?}) with {} sites",
            state,
            db.job_sites.len()
        );
        Ok((db, state, report))
    }

    fn read_raw(&self) -> (StoredState, Option<Value>) {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No database at {}; creating a new one", self.path.display());
                return (StoredState::Missing, None);
            }
            Err(e) => {
                log::warn!(
                    "Could not read database {}: {}; starting fresh",
                    self.path.display(),
                    e
                );
                return (StoredState::Unreadable, None);
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(value) => (StoredState::Loaded, Some(value)),
            Err(e) => {
                log::warn!(
                    "Database {} is not valid JSON ({}); starting fresh",
                    self.path.display(),
                    e
                );
                (StoredState::Unreadable, None)
            }
        }
    }

    /// Replaces the stored document with `db`.
    pub fn save(&self, db: &Database) -> Result<(), StorageError> {
        let _span = tracing::debug_span!("store.save", file = %redact_path(&self.path)).entered();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let bytes = serde_json::to_vec_pretty(db)?;
        let tmp_path = self.temp_path();

        fs::write(&tmp_path, &bytes).map_err(|e| StorageError::WriteFile {
            path: tmp_path.clone(),
            source: e,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| StorageError::Rename {
            from: tmp_path.clone(),
            to: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }

    /// Raw bytes of the stored document, for backups. Creates the document
    /// first if nothing is stored yet.
    pub fn export(&self) -> Result<Vec<u8>, StorageError> {
        if !self.path.exists() {
            self.load()?;
        }
        fs::read(&self.path).map_err(|e| StorageError::ReadFile {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Replaces everything with an empty database. Photo files on disk are
    /// not touched.
    pub fn reset(&self) -> Result<Database, StorageError> {
        log::warn!("Resetting database at {}", self.path.display());
        let db = Database::new();
        self.save(&db)?;
        Ok(db)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "app_db.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
