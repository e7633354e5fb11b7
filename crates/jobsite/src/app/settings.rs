use std::path::Path;

use super::{ApiResponse, JobsiteApp, Notice};
use crate::error::StorageError;
use crate::session::{Page, SessionContext};

/// Default file name offered for backups.
pub const EXPORT_FILE_NAME: &str = "jobsite_buddy_db.json";

impl JobsiteApp {
    /// Bytes of the stored document, exactly as persisted.
    pub fn export(&self, session: &mut SessionContext) -> ApiResponse<Vec<u8>> {
        session.navigate(Page::Settings);
        match self.store.export() {
            Ok(bytes) => ApiResponse::ok(bytes),
            Err(e) => ApiResponse::rejected(e),
        }
    }

    /// Writes the stored document to `dest`. Refuses to overwrite an
    /// existing file.
    pub fn export_to(&self, session: &mut SessionContext, dest: &Path) -> ApiResponse<String> {
        let bytes = match self.export(session) {
            ApiResponse {
                data: Some(bytes), ..
            } => bytes,
            failed => return ApiResponse::err(failed.error.unwrap_or_default()),
        };

        if dest.exists() {
            return ApiResponse::rejected(StorageError::FileExists(dest.to_path_buf()));
        }
        if let Err(e) = std::fs::write(dest, &bytes) {
            return ApiResponse::rejected(StorageError::WriteFile {
                path: dest.to_path_buf(),
                source: e,
            });
        }

        let dest = dest.display().to_string();
        log::info!("Exported database ({} bytes)", bytes.len());
        ApiResponse::ok(dest.clone()).with_notice(Notice::success(format!("Exported to {}", dest)))
    }

    /// Replaces everything with an empty database. Uploaded photos and
    /// downloaded manuals stay on disk.
    pub fn reset(&mut self, session: &mut SessionContext) -> ApiResponse<()> {
        session.navigate(Page::Settings);
        match self.store.reset() {
            Ok(db) => {
                self.db = db;
                session.reset();
                ApiResponse::ok(()).with_notice(Notice::success("All data cleared"))
            }
            Err(e) => ApiResponse::rejected(e),
        }
    }
}
