use serde::Serialize;

use super::{ApiResponse, JobsiteApp, Notice};
use crate::error::ValidationError;
use crate::model::{Item, ListKind, Priority};
use crate::session::{Page, SessionContext};

/// An item together with the list it lives in.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRef {
    pub list: ListKind,
    pub item: Item,
}

impl JobsiteApp {
    /// Adds an item to a list of the selected site. The pending "add" form
    /// value for that list is cleared once the item is stored.
    pub fn add_item(
        &mut self,
        session: &mut SessionContext,
        list: ListKind,
        text: &str,
        priority: Priority,
        link: Option<&str>,
    ) -> ApiResponse<ItemRef> {
        session.navigate(Page::JobSites);

        let response = self.with_active_site(session, |site, _| {
            let item = site.list_mut(list).add(text, priority, link)?.clone();
            let notice = Notice::success(format!("Added to {}", list.label()));
            Ok((ItemRef { list, item }, notice))
        });

        if response.success {
            if let Some(site) = session.active_site().map(str::to_string) {
                session.take_input(&SessionContext::item_form_key(&site, list));
            }
        }
        response
    }

    /// Flips done/open. `id` may be an unambiguous prefix.
    pub fn toggle_item(
        &mut self,
        session: &mut SessionContext,
        list: ListKind,
        id: &str,
    ) -> ApiResponse<ItemRef> {
        self.with_active_site(session, |site, _| {
            let items = site.list_mut(list);
            let id = items.resolve_id(id)?;
            let item = items.toggle_done(&id)?.clone();
            let notice = if item.done {
                Notice::success(format!("Done: {}", item.text))
            } else {
                Notice::info(format!("Reopened: {}", item.text))
            };
            Ok((ItemRef { list, item }, notice))
        })
    }

    pub fn set_item_priority(
        &mut self,
        session: &mut SessionContext,
        list: ListKind,
        id: &str,
        priority: Priority,
    ) -> ApiResponse<ItemRef> {
        self.with_active_site(session, |site, _| {
            let items = site.list_mut(list);
            let id = items.resolve_id(id)?;
            let item = items.set_priority(&id, priority)?.clone();
            let notice = Notice::success(format!("{} is now {}", item.text, priority));
            Ok((ItemRef { list, item }, notice))
        })
    }

    /// Removes exactly the item with `id`; items with the same text stay.
    pub fn remove_item(
        &mut self,
        session: &mut SessionContext,
        list: ListKind,
        id: &str,
    ) -> ApiResponse<ItemRef> {
        self.with_active_site(session, |site, _| {
            let items = site.list_mut(list);
            let id = items.resolve_id(id)?;
            let item = items
                .remove(&id)
                .ok_or_else(|| ValidationError::ItemNotFound(id.clone()))?;
            let notice = Notice::success(format!("Removed: {}", item.text));
            Ok((ItemRef { list, item }, notice))
        })
    }
}
