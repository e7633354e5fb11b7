//! Per-session UI state, passed explicitly into every handler.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::ListKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    JobSites,
    Photos,
    Manuals,
    Settings,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::JobSites, Page::Photos, Page::Manuals, Page::Settings];

    pub fn label(self) -> &'static str {
        match self {
            Page::JobSites => "Job Sites",
            Page::Photos => "Photos",
            Page::Manuals => "Manuals",
            Page::Settings => "Settings",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "job_sites" | "sites" => Ok(Page::JobSites),
            "photos" => Ok(Page::Photos),
            "manuals" => Ok(Page::Manuals),
            "settings" => Ok(Page::Settings),
            other => Err(format!("Unknown page '{}'", other)),
        }
    }
}

/// Current page, selected site and half-filled form values of one user
/// session. Nothing in here is persisted.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    page: Page,
    active_site: Option<String>,
    pending: HashMap<String, String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn navigate(&mut self, page: Page) {
        if self.page != page {
            log::debug!("Navigating to {}", page);
            self.page = page;
        }
    }

    pub fn active_site(&self) -> Option<&str> {
        self.active_site.as_deref()
    }

    /// Remembers `key` as given. Callers pass the stored key, which may
    /// differ from its normalized form.
    pub fn select_site(&mut self, key: &str) {
        self.active_site = Some(key.to_string());
    }

    pub fn clear_site(&mut self) {
        self.active_site = None;
    }

    /// Key of the "add item" form for one list of one site.
    pub fn item_form_key(site: &str, kind: ListKind) -> String {
        format!("{}::{}::add", site, kind.key())
    }

    pub fn set_input(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pending.insert(key.into(), value.into());
    }

    pub fn input(&self, key: &str) -> Option<&str> {
        self.pending.get(key).map(String::as_str)
    }

    /// Removes and returns a pending form value, e.g. once it was submitted.
    pub fn take_input(&mut self, key: &str) -> Option<String> {
        self.pending.remove(key)
    }

    /// Forgets the selected site and every pending form value.
    pub fn reset(&mut self) {
        self.active_site = None;
        self.pending.clear();
    }
}
