use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::error::{Result, StorageError, ValidationError};
use crate::sanitize::redact_path;

pub const DEFAULT_PHOTO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

const MAX_NAME_ATTEMPTS: usize = 16;

/// Content directory for uploaded photos. Files are only ever added here;
/// removing a reference from a site leaves the file in place.
pub struct PhotoStore {
    uploads_dir: PathBuf,
    accepted_extensions: Vec<String>,
}

impl PhotoStore {
    pub fn new<P: AsRef<Path>>(uploads_dir: P) -> Self {
        Self::with_extensions(
            uploads_dir,
            DEFAULT_PHOTO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        )
    }

    pub fn with_extensions<P: AsRef<Path>>(uploads_dir: P, accepted_extensions: Vec<String>) -> Self {
        Self {
            uploads_dir: uploads_dir.as_ref().to_path_buf(),
            accepted_extensions: accepted_extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Returns the lowercased extension (with leading dot) of
    /// `original_name` if it is an accepted photo type.
    pub fn check_extension(&self, original_name: &str) -> std::result::Result<String, ValidationError> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if ext.is_empty() || !self.accepted_extensions.contains(&ext) {
            return Err(ValidationError::UnsupportedPhotoType(original_name.to_string()));
        }
        Ok(format!(".{}", ext))
    }

    /// Writes `content` under a fresh `{unix-timestamp}_{8-hex}{ext}` name
    /// and returns the new path.
    pub fn store_upload(&self, content: &[u8], original_name: &str) -> Result<PathBuf> {
        let ext = self.check_extension(original_name)?;
        self.ensure_directory()?;

        let timestamp = Utc::now().timestamp();
        for _ in 0..MAX_NAME_ATTEMPTS {
            let filename = format!("{}_{}{}", timestamp, random_suffix(), ext);
            let path = self.uploads_dir.join(&filename);

            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(file) => {
                    write_or_remove(file, &path, content)?;
                    log::info!("Stored photo {} ({} bytes)", redact_path(&path), content.len());
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(StorageError::WriteFile { path, source: e }.into()),
            }
        }

        Err(StorageError::FileExists(self.uploads_dir.join(format!("{}_*{}", timestamp, ext))).into())
    }

    /// Stores an upload and appends its path to `bucket`.
    pub fn add_photo(
        &self,
        bucket: &mut Vec<String>,
        content: &[u8],
        original_name: &str,
    ) -> Result<String> {
        let path = self.store_upload(content, original_name)?;
        let path = path.display().to_string();
        bucket.push(path.clone());
        Ok(path)
    }

    fn ensure_directory(&self) -> std::result::Result<(), StorageError> {
        if !self.uploads_dir.exists() {
            std::fs::create_dir_all(&self.uploads_dir).map_err(|e| StorageError::CreateDirectory {
                path: self.uploads_dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}

/// Writes `content` to the freshly created file at `path`. A failed write
/// deletes the file so no truncated upload is left behind.
fn write_or_remove<W: Write>(
    mut file: W,
    path: &Path,
    content: &[u8],
) -> std::result::Result<(), StorageError> {
    if let Err(e) = file.write_all(content).and_then(|_| file.flush()) {
        drop(file);
        if let Err(remove_err) = std::fs::remove_file(path) {
            log::warn!(
                "Could not remove partial upload {}: {}",
                redact_path(path),
                remove_err
            );
        }
        return Err(StorageError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}

fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
