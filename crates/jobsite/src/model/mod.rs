pub mod database;
pub mod item;
pub mod site;

pub use database::{clean_name, Database, APP_VERSION, CURRENT_SCHEMA_VERSION};
pub use item::{Item, ItemList, Priority};
pub use site::{remove_photo, ListKind, PhotoSection, SectionPhotos, Site, SiteSummary};
