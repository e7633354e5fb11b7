use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::model::item::now;
use crate::model::site::Site;

/// Schema generation written by this build.
///
/// 1. flat string lists and a single `photos` list per site
/// 2. item objects and per-section photo buckets
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub version: u32,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub app_version: String,
    #[serde(default)]
    pub job_sites: BTreeMap<String, Site>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    pub fn new() -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            created_at: now(),
            app_version: APP_VERSION.to_string(),
            job_sites: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Stored key for `name`: the exact key when present, then the
    /// normalized name, then any stored key that normalizes to the same
    /// text. Keys written by older releases are never rewritten, so a key
    /// with stray whitespace stays reachable.
    pub fn resolve_key(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.job_sites.get_key_value(name) {
            return Some(key);
        }
        let cleaned = clean_name(name);
        if let Some((key, _)) = self.job_sites.get_key_value(&cleaned) {
            return Some(key);
        }
        self.job_sites
            .keys()
            .find(|key| clean_name(key) == cleaned)
            .map(String::as_str)
    }

    /// Returns the site called `name`, creating it under the normalized
    /// name when no stored key matches. Existing sites are left untouched.
    pub fn ensure_site(&mut self, name: &str) -> Result<(String, &mut Site), ValidationError> {
        let cleaned = clean_name(name);
        if cleaned.is_empty() {
            return Err(ValidationError::EmptySiteName);
        }

        let key = match self.resolve_key(name) {
            Some(key) => key.to_string(),
            None => {
                log::info!("Creating job site '{}'", cleaned);
                cleaned
            }
        };
        let site = self.job_sites.entry(key.clone()).or_default();
        Ok((key, site))
    }

    pub fn site(&self, name: &str) -> Result<&Site, ValidationError> {
        self.resolve_key(name)
            .and_then(|key| self.job_sites.get(key))
            .ok_or_else(|| ValidationError::SiteNotFound(clean_name(name)))
    }

    pub fn site_mut(&mut self, name: &str) -> Result<&mut Site, ValidationError> {
        let key = self
            .resolve_key(name)
            .map(str::to_string)
            .ok_or_else(|| ValidationError::SiteNotFound(clean_name(name)))?;
        self.job_sites
            .get_mut(&key)
            .ok_or(ValidationError::SiteNotFound(key))
    }

    /// Site names in sorted order.
    pub fn site_names(&self) -> impl Iterator<Item = &str> {
        self.job_sites.keys().map(String::as_str)
    }
}

/// Trims and collapses internal whitespace runs to a single space.
pub fn clean_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  Condo   Hwy\t33 "), "Condo Hwy 33");
        assert_eq!(clean_name("   "), "");
    }

    #[test]
    fn test_ensure_site_is_idempotent() {
        let mut db = Database::new();
        let created_at = db.ensure_site("Canco Gas Station").unwrap().1.created_at;
        let (name, site) = db.ensure_site("  Canco   Gas Station ").unwrap();

        assert_eq!(name, "Canco Gas Station");
        assert_eq!(site.created_at, created_at);
        assert_eq!(db.job_sites.len(), 1);
    }

    #[test]
    fn test_ensure_site_keeps_existing_content() {
        let mut db = Database::new();
        db.ensure_site("Gurudwara").unwrap().1.notes = "Panel in basement".to_string();
        let (_, site) = db.ensure_site("Gurudwara").unwrap();
        assert_eq!(site.notes, "Panel in basement");
    }

    #[test]
    fn test_ensure_site_rejects_blank_name() {
        let mut db = Database::new();
        assert_eq!(db.ensure_site(" \t ").unwrap_err(), ValidationError::EmptySiteName);
        assert!(db.job_sites.is_empty());
    }

    #[test]
    fn test_site_names_are_case_sensitive_and_sorted() {
        let mut db = Database::new();
        db.ensure_site("b site").unwrap();
        db.ensure_site("A site").unwrap();
        db.ensure_site("a site").unwrap();
        let names: Vec<&str> = db.site_names().collect();
        assert_eq!(names, vec!["A site", "a site", "b site"]);
    }

    #[test]
    fn test_unnormalized_stored_key_is_reachable() {
        let mut db = Database::new();
        db.job_sites
            .insert("Canco  Gas Station".to_string(), Site::new());

        assert!(db.site("Canco  Gas Station").is_ok());
        assert!(db.site("Canco Gas Station").is_ok());
        assert!(db.site_mut(" Canco Gas   Station").is_ok());

        let (key, _) = db.ensure_site("Canco Gas Station").unwrap();
        assert_eq!(key, "Canco  Gas Station");
        assert_eq!(db.job_sites.len(), 1);
    }

    #[test]
    fn test_exact_key_wins_over_normalized_match() {
        let mut db = Database::new();
        db.job_sites.insert("A  B".to_string(), Site::new());
        db.job_sites.insert("A B".to_string(), Site::new());
        db.job_sites.get_mut("A  B").unwrap().notes = "two spaces".to_string();

        assert_eq!(db.resolve_key("A  B"), Some("A  B"));
        assert_eq!(db.resolve_key("A B"), Some("A B"));
        assert_eq!(db.site("A  B").unwrap().notes, "two spaces");
    }

    #[test]
    fn test_site_lookup_missing() {
        let db = Database::new();
        assert_eq!(
            db.site("Nowhere").unwrap_err(),
            ValidationError::SiteNotFound("Nowhere".to_string())
        );
    }
}
