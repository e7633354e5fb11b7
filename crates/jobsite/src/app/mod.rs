//! Application service consumed by the presentation layer.
//!
//! Handlers are organized by page:
//! - `sites`: site creation, selection, listing and notes
//! - `items`: the four per-site item lists
//! - `photos`: photo upload, removal and previews
//! - `manuals`: manual search and download, price sniffing, OCR
//! - `settings`: export and reset
//!
//! Every mutating handler validates first, then mutates the in-memory
//! database, then writes the whole document back before returning.

pub mod items;
pub mod manuals;
pub mod photos;
pub mod settings;
pub mod sites;

pub use items::ItemRef;
pub use sites::{ListView, SiteListing, SiteView};

use serde::Serialize;

use crate::config::AppConfig;
use crate::error::{JobsiteError, Result, ValidationError};
use crate::model::{Database, Site};
use crate::processor::OcrProcessor;
use crate::session::SessionContext;
use crate::storage::PhotoStore;
use crate::store::{JsonStore, StoredState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
}

/// Non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// Response wrapper for handler calls.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            notice: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    /// Rejected input or a failed save, logged and turned into an error
    /// response.
    pub fn rejected(error: impl Into<JobsiteError>) -> Self {
        let error = error.into();
        match &error {
            JobsiteError::Validation(e) => log::warn!("Rejected: {}", e),
            other => log::error!("{}", other),
        }
        Self::err(error.to_string())
    }
}

/// In-memory database plus everything needed to persist it and to reach
/// the collaborators.
pub struct JobsiteApp {
    config: AppConfig,
    store: JsonStore,
    photos: PhotoStore,
    ocr: OcrProcessor,
    db: Database,
    stored_state: StoredState,
}

impl JobsiteApp {
    /// Loads (and migrates) the database named by `config`. Fails only when
    /// the migrated document cannot be written back.
    pub fn open(config: AppConfig) -> Result<Self> {
        let _span = tracing::info_span!("app.open").entered();

        let store = JsonStore::new(config.db_path());
        let (db, stored_state, report) = store.load_with_report()?;
        if report.changed() {
            log::info!("Upgraded stored data from version {:?}", report.from_version);
        }

        let photos = PhotoStore::with_extensions(
            config.uploads_path(),
            config.photos.accepted_extensions.clone(),
        );
        let ocr = OcrProcessor::new(&config.ocr);

        Ok(Self {
            config,
            store,
            photos,
            ocr,
            db,
            stored_state,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// What was on disk when the app was opened.
    pub fn stored_state(&self) -> StoredState {
        self.stored_state
    }

    /// Notice for the first page render after opening.
    pub fn startup_notice(&self) -> Option<Notice> {
        match self.stored_state {
            StoredState::Unreadable => Some(Notice::warning(
                "Saved data could not be read; started with an empty database",
            )),
            StoredState::Missing | StoredState::Loaded => None,
        }
    }

    /// Writes the whole document and wraps `data` into a response. When the
    /// write fails the in-memory document goes back to `before`, so a
    /// rejected action never reaches disk with a later save.
    fn commit<T>(&mut self, before: Database, data: T, notice: Notice) -> ApiResponse<T> {
        match self.store.save(&self.db) {
            Ok(()) => ApiResponse::ok(data).with_notice(notice),
            Err(e) => {
                log::warn!("Discarding unsaved change");
                self.db = before;
                ApiResponse::rejected(e)
            }
        }
    }

    fn active_site_name(session: &SessionContext) -> std::result::Result<String, ValidationError> {
        session
            .active_site()
            .map(str::to_string)
            .ok_or(ValidationError::NoSiteSelected)
    }

    /// Runs `action` against the selected site and persists on success.
    /// When `action` or the save fails the site is left as it was.
    fn with_active_site<T, F>(&mut self, session: &SessionContext, action: F) -> ApiResponse<T>
    where
        F: FnOnce(&mut Site, &PhotoStore) -> Result<(T, Notice)>,
    {
        let name = match Self::active_site_name(session) {
            Ok(name) => name,
            Err(e) => return ApiResponse::rejected(e),
        };
        let before = self.db.clone();
        let site = match self.db.site_mut(&name) {
            Ok(site) => site,
            Err(e) => return ApiResponse::rejected(e),
        };

        match action(site, &self.photos) {
            Ok((data, notice)) => self.commit(before, data, notice),
            Err(e) => {
                self.db = before;
                ApiResponse::rejected(e)
            }
        }
    }

    /// Read-only access to the selected site.
    fn read_active_site<T, F>(&self, session: &SessionContext, read: F) -> ApiResponse<T>
    where
        F: FnOnce(&str, &Site) -> T,
    {
        let result = Self::active_site_name(session)
            .and_then(|name| self.db.site(&name).map(|site| read(&name, site)));
        match result {
            Ok(data) => ApiResponse::ok(data),
            Err(e) => ApiResponse::rejected(e),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::open_app;
    use super::*;
    use crate::model::{ListKind, Priority};

    #[test]
    fn test_api_response_serialization() {
        let ok = serde_json::to_value(ApiResponse::ok(3).with_notice(Notice::info("hi"))).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({
                "success": true,
                "data": 3,
                "notice": { "level": "info", "message": "hi" }
            })
        );

        let err = serde_json::to_value(ApiResponse::<()>::err("nope")).unwrap();
        assert_eq!(err, serde_json::json!({ "success": false, "error": "nope" }));
    }

    #[test]
    fn test_open_creates_database_file() {
        let (_dir, app) = open_app();
        assert!(app.config().db_path().exists());
        assert_eq!(app.stored_state(), StoredState::Missing);
        assert!(app.startup_notice().is_none());
        assert!(app.database().job_sites.is_empty());
    }

    #[test]
    fn test_open_with_corrupted_file_warns() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::with_data_dir(temp_dir.path());
        std::fs::write(config.db_path(), "{{{ not json").unwrap();

        let app = JobsiteApp::open(config).unwrap();

        assert_eq!(app.stored_state(), StoredState::Unreadable);
        assert_eq!(
            app.startup_notice().map(|n| n.level),
            Some(NoticeLevel::Warning)
        );
    }

    #[test]
    fn test_failed_save_discards_change() {
        let (dir, mut app) = open_app();
        let mut session = SessionContext::new();
        app.create_site(&mut session, "Shop");
        let blocker = dir.path().join("app_db.json.tmp");
        std::fs::create_dir(&blocker).unwrap();

        let response = app.add_item(&mut session, ListKind::ToBuy, "Wire", Priority::Medium, None);

        assert!(!response.success);
        assert!(app.database().job_sites["Shop"].to_buy.is_empty());

        std::fs::remove_dir(&blocker).unwrap();
        assert!(app.set_notes(&mut session, "Gate code 4321").success);

        let stored = test_support::reload(&app);
        assert!(stored.job_sites["Shop"].to_buy.is_empty());
        assert_eq!(stored.job_sites["Shop"].notes, "Gate code 4321");
    }

    #[test]
    fn test_handlers_need_a_selected_site() {
        let (_dir, mut app) = open_app();
        let mut session = SessionContext::new();

        let response = app.set_notes(&mut session, "hello");

        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("Invalid input: Select a site first")
        );
    }
}
