pub mod app;
pub mod config;
pub mod error;
pub mod lookup;
pub mod migration;
pub mod model;
pub mod processor;
pub mod query;
pub mod sanitize;
pub mod session;
pub mod storage;
pub mod store;

pub use app::{ApiResponse, JobsiteApp, Notice, NoticeLevel};
pub use config::{load_config, load_config_or_default, AppConfig};
pub use error::{
    ConfigError, JobsiteError, LookupError, Result, StorageError, ValidationError,
};
pub use lookup::{BestEffort, FailureKind, ManualFinder, PriceSniffer, SearchHit};
pub use migration::{migrate, MigrationReport};
pub use model::{Database, Item, ItemList, ListKind, PhotoSection, Priority, Site};
pub use processor::OcrProcessor;
pub use query::{search_site, sorted_for_display, SiteMatches, SiteSearch};
pub use session::{Page, SessionContext};
pub use storage::{PhotoPreview, PhotoStore};
pub use store::{JsonStore, StoredState};
