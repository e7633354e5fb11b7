use chrono::NaiveDateTime;
use serde::Serialize;

use super::{ApiResponse, JobsiteApp, Notice};
use crate::error::ValidationError;
use crate::model::{clean_name, Item, ListKind, SiteSummary};
use crate::query::{search_site, sorted_for_display, SiteSearch};
use crate::session::{Page, SessionContext};

#[derive(Debug, Clone, Serialize)]
pub struct SiteListing {
    pub name: String,
    pub created_at: NaiveDateTime,
    pub summary: SiteSummary,
}

/// One list of a site in display order.
#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub kind: ListKind,
    pub label: &'static str,
    pub items: Vec<Item>,
}

/// Everything the site page shows. `filtered` is false for a blank query,
/// in which case every item is listed and `notes_match` is `None`.
#[derive(Debug, Clone, Serialize)]
pub struct SiteView {
    pub name: String,
    pub created_at: NaiveDateTime,
    pub filtered: bool,
    pub lists: Vec<ListView>,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes_match: Option<bool>,
    pub summary: SiteSummary,
}

impl JobsiteApp {
    /// Creates the site if needed and selects it.
    pub fn create_site(&mut self, session: &mut SessionContext, name: &str) -> ApiResponse<String> {
        session.navigate(Page::JobSites);

        if let Some(key) = self.db.resolve_key(name).map(str::to_string) {
            session.select_site(&key);
            let notice = Notice::info(format!("Opened '{}'", key));
            return ApiResponse::ok(key).with_notice(notice);
        }

        let before = self.db.clone();
        let key = match self.db.ensure_site(name) {
            Ok((key, _)) => key,
            Err(e) => return ApiResponse::rejected(e),
        };
        let notice = Notice::success(format!("Created site '{}'", key));
        let response = self.commit(before, key, notice);
        if let Some(key) = &response.data {
            session.select_site(key);
        }
        response
    }

    /// Selects an existing site.
    pub fn select_site(&mut self, session: &mut SessionContext, name: &str) -> ApiResponse<String> {
        session.navigate(Page::JobSites);
        match self.db.resolve_key(name).map(str::to_string) {
            Some(key) => {
                session.select_site(&key);
                ApiResponse::ok(key)
            }
            None => ApiResponse::rejected(ValidationError::SiteNotFound(clean_name(name))),
        }
    }

    /// All sites in name order with their dashboard counts.
    pub fn list_sites(&self, session: &mut SessionContext) -> ApiResponse<Vec<SiteListing>> {
        session.navigate(Page::JobSites);
        let listings = self
            .db
            .job_sites
            .iter()
            .map(|(name, site)| SiteListing {
                name: name.clone(),
                created_at: site.created_at,
                summary: site.summary(),
            })
            .collect();
        ApiResponse::ok(listings)
    }

    /// The selected site, filtered by `query` and sorted for display.
    pub fn show_site(&self, session: &mut SessionContext, query: &str) -> ApiResponse<SiteView> {
        session.navigate(Page::JobSites);
        self.read_active_site(session, |name, site| {
            let search = search_site(site, query);
            let lists = ListKind::ALL
                .into_iter()
                .map(|kind| ListView {
                    kind,
                    label: kind.label(),
                    items: sorted_for_display(search.visible(site, kind))
                        .into_iter()
                        .cloned()
                        .collect(),
                })
                .collect();
            let notes_match = match &search {
                SiteSearch::NoFilter => None,
                SiteSearch::Filtered(matches) => Some(matches.notes_match),
            };

            SiteView {
                name: name.to_string(),
                created_at: site.created_at,
                filtered: search.is_filtered(),
                lists,
                notes: site.notes.clone(),
                notes_match,
                summary: site.summary(),
            }
        })
    }

    pub fn set_notes(&mut self, session: &mut SessionContext, notes: &str) -> ApiResponse<String> {
        self.with_active_site(session, |site, _| {
            site.set_notes(notes);
            Ok((site.notes.clone(), Notice::success("Notes saved")))
        })
    }

    pub fn append_notes(&mut self, session: &mut SessionContext, line: &str) -> ApiResponse<String> {
        if line.trim().is_empty() {
            return ApiResponse::rejected(ValidationError::EmptyNote);
        }
        self.with_active_site(session, |site, _| {
            site.append_notes(line);
            Ok((site.notes.clone(), Notice::success("Notes updated")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{open_app, reload};
    use crate::model::Priority;

    #[test]
    fn test_create_site_persists_and_selects() {
        let (_dir, mut app) = open_app();
        let mut session = SessionContext::new();

        let response = app.create_site(&mut session, "  Smith   Residence ");

        assert!(response.success);
        assert_eq!(response.data.as_deref(), Some("Smith Residence"));
        assert_eq!(session.active_site(), Some("Smith Residence"));
        assert!(reload(&app).job_sites.contains_key("Smith Residence"));
    }

    #[test]
    fn test_create_site_twice_keeps_data() {
        let (_dir, mut app) = open_app();
        let mut session = SessionContext::new();
        app.create_site(&mut session, "Shop");
        app.add_item(&mut session, ListKind::ToBuy, "Wire nuts", Priority::Low, None);

        let response = app.create_site(&mut session, "Shop");

        assert!(response.success);
        assert_eq!(app.database().job_sites.len(), 1);
        assert_eq!(app.database().job_sites["Shop"].to_buy.len(), 1);
    }

    #[test]
    fn test_create_site_rejects_blank_name() {
        let (_dir, mut app) = open_app();
        let mut session = SessionContext::new();

        let response = app.create_site(&mut session, "   ");

        assert!(!response.success);
        assert!(app.database().job_sites.is_empty());
        assert_eq!(session.active_site(), None);
    }

    #[test]
    fn test_select_unknown_site() {
        let (_dir, mut app) = open_app();
        let mut session = SessionContext::new();
        assert!(!app.select_site(&mut session, "Nowhere").success);
        assert_eq!(session.active_site(), None);
    }

    #[test]
    fn test_stored_key_with_extra_spaces_is_selectable() {
        let (_dir, mut app) = open_app();
        let mut session = SessionContext::new();
        app.db
            .job_sites
            .insert("Canco  Gas Station".to_string(), crate::model::Site::new());

        let selected = app.select_site(&mut session, "Canco  Gas Station");
        assert_eq!(selected.data.as_deref(), Some("Canco  Gas Station"));
        assert!(app.select_site(&mut session, "Canco Gas Station").success);
        assert_eq!(session.active_site(), Some("Canco  Gas Station"));

        let created = app.create_site(&mut session, "Canco Gas Station");
        assert_eq!(created.data.as_deref(), Some("Canco  Gas Station"));
        assert_eq!(app.database().job_sites.len(), 1);

        assert!(app.set_notes(&mut session, "Pumps on island 2").success);
        assert_eq!(
            reload(&app).job_sites["Canco  Gas Station"].notes,
            "Pumps on island 2"
        );
    }

    #[test]
    fn test_create_site_not_kept_when_save_fails() {
        let (dir, mut app) = open_app();
        let mut session = SessionContext::new();
        std::fs::create_dir(dir.path().join("app_db.json.tmp")).unwrap();

        let response = app.create_site(&mut session, "Shop");

        assert!(!response.success);
        assert!(app.database().job_sites.is_empty());
        assert_eq!(session.active_site(), None);
    }

    #[test]
    fn test_list_sites_sorted() {
        let (_dir, mut app) = open_app();
        let mut session = SessionContext::new();
        for name in ["Zeta", "Alpha", "Mid"] {
            app.create_site(&mut session, name);
        }

        let names: Vec<_> = app
            .list_sites(&mut session)
            .data
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn test_show_site_filters_and_sorts() {
        let (_dir, mut app) = open_app();
        let mut session = SessionContext::new();
        app.create_site(&mut session, "Shop");
        app.add_item(&mut session, ListKind::WhatToDo, "Hang GFCI", Priority::Low, None);
        app.add_item(&mut session, ListKind::WhatToDo, "Label panel", Priority::High, None);
        app.add_item(&mut session, ListKind::ToBuy, "GFCI 20A", Priority::Medium, None);
        app.set_notes(&mut session, "Customer wants gfci in bath");

        let view = app.show_site(&mut session, "").data.unwrap();
        assert!(!view.filtered);
        assert_eq!(view.notes_match, None);
        let todo: Vec<_> = view.lists[0].items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(todo, vec!["Label panel", "Hang GFCI"]);

        let view = app.show_site(&mut session, "GFCI").data.unwrap();
        assert!(view.filtered);
        assert_eq!(view.notes_match, Some(true));
        assert_eq!(view.lists[0].items.len(), 1);
        assert_eq!(view.lists[3].kind, ListKind::ToBuy);
        assert_eq!(view.lists[3].items.len(), 1);
        assert!(view.lists[1].items.is_empty());
    }

    #[test]
    fn test_notes_set_and_append() {
        let (_dir, mut app) = open_app();
        let mut session = SessionContext::new();
        app.create_site(&mut session, "Shop");

        app.set_notes(&mut session, "Gate code 1234");
        let response = app.append_notes(&mut session, "Dog in yard");

        assert_eq!(response.data.as_deref(), Some("Gate code 1234\nDog in yard"));
        assert_eq!(reload(&app).job_sites["Shop"].notes, "Gate code 1234\nDog in yard");
        assert!(!app.append_notes(&mut session, "  ").success);
    }
}
