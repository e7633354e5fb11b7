//! Test harness for isolated test execution.
//!
//! Each `TestHarness` owns a temporary data directory with its own database
//! file and uploads directory, so tests never see each other's state.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use jobsite::{AppConfig, Database, JobsiteApp, JsonStore, SessionContext};

pub struct TestHarness {
    temp_dir: TempDir,
    /// Configuration rooted at the temp directory.
    pub config: AppConfig,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = AppConfig::with_data_dir(temp_dir.path());
        Self { temp_dir, config }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.config.db_path()
    }

    pub fn store(&self) -> JsonStore {
        JsonStore::new(self.db_path())
    }

    /// Writes raw bytes as the stored database.
    pub fn write_db_bytes(&self, content: &[u8]) {
        let path = self.db_path();
        std::fs::create_dir_all(path.parent().expect("db path has a parent"))
            .expect("Failed to create data dir");
        std::fs::write(&path, content).expect("Failed to write database file");
    }

    pub fn write_db(&self, value: &Value) {
        let json = serde_json::to_vec_pretty(value).expect("Failed to serialize document");
        self.write_db_bytes(&json);
    }

    /// The stored document as generic JSON.
    pub fn read_db(&self) -> Value {
        let bytes = std::fs::read(self.db_path()).expect("Failed to read database file");
        serde_json::from_slice(&bytes).expect("Stored database is not JSON")
    }

    pub fn load(&self) -> Database {
        self.store().load().expect("Failed to load database")
    }

    pub fn open_app(&self) -> JobsiteApp {
        JobsiteApp::open(self.config.clone()).expect("Failed to open app")
    }

    /// Opens the app with a site already created and selected.
    pub fn open_with_site(&self, name: &str) -> (JobsiteApp, SessionContext) {
        let mut app = self.open_app();
        let mut session = SessionContext::new();
        let created = app.create_site(&mut session, name);
        assert!(created.success, "create_site failed: {:?}", created.error);
        (app, session)
    }

    /// Writes a small valid PNG outside the uploads directory.
    pub fn write_png(&self, filename: &str) -> PathBuf {
        let path = self.temp_path().join(filename);
        image::RgbImage::from_pixel(3, 2, image::Rgb([200, 40, 40]))
            .save(&path)
            .expect("Failed to write PNG");
        path
    }
}
