//! Search and display ordering over a site's lists. Linear scans only.

use std::cmp::Ordering;

use serde::Serialize;

use crate::model::{Item, ListKind, Site};

/// Items of one site that matched a query, per list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteMatches<'a> {
    pub what_to_do: Vec<&'a Item>,
    pub materials_need: Vec<&'a Item>,
    pub materials_have: Vec<&'a Item>,
    pub to_buy: Vec<&'a Item>,
    pub notes_match: bool,
}

impl<'a> SiteMatches<'a> {
    pub fn list(&self, kind: ListKind) -> &[&'a Item] {
        match kind {
            ListKind::WhatToDo => &self.what_to_do,
            ListKind::MaterialsNeed => &self.materials_need,
            ListKind::MaterialsHave => &self.materials_have,
            ListKind::ToBuy => &self.to_buy,
        }
    }

    pub fn item_count(&self) -> usize {
        ListKind::ALL.into_iter().map(|kind| self.list(kind).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0 && !self.notes_match
    }
}

/// Result of searching a site. A blank query is not a filter at all, which
/// is different from a filter that matched nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SiteSearch<'a> {
    NoFilter,
    Filtered(SiteMatches<'a>),
}

impl<'a> SiteSearch<'a> {
    pub fn is_filtered(&self) -> bool {
        matches!(self, SiteSearch::Filtered(_))
    }

    /// Items of `kind` to show: the matches when filtered, everything
    /// otherwise.
    pub fn visible(&self, site: &'a Site, kind: ListKind) -> Vec<&'a Item> {
        match self {
            SiteSearch::NoFilter => site.list(kind).iter().collect(),
            SiteSearch::Filtered(matches) => matches.list(kind).to_vec(),
        }
    }
}

/// Case-insensitive substring search over item text and links and the
/// site's notes.
pub fn search_site<'a>(site: &'a Site, query: &str) -> SiteSearch<'a> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return SiteSearch::NoFilter;
    }

    let filter = |kind: ListKind| -> Vec<&'a Item> {
        site.list(kind)
            .iter()
            .filter(|item| item.matches_lowercase(&needle))
            .collect()
    };

    SiteSearch::Filtered(SiteMatches {
        what_to_do: filter(ListKind::WhatToDo),
        materials_need: filter(ListKind::MaterialsNeed),
        materials_have: filter(ListKind::MaterialsHave),
        to_buy: filter(ListKind::ToBuy),
        notes_match: site.notes.to_lowercase().contains(&needle),
    })
}

/// Display order: open items first, then by priority (High, Medium, Low),
/// then oldest first.
pub fn display_order(a: &Item, b: &Item) -> Ordering {
    a.done
        .cmp(&b.done)
        .then_with(|| a.priority.rank().cmp(&b.priority.rank()))
        .then_with(|| a.created_at.cmp(&b.created_at))
}

/// Returns the items in display order without touching storage order.
pub fn sorted_for_display<'a, I>(items: I) -> Vec<&'a Item>
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut sorted: Vec<&Item> = items.into_iter().collect();
    sorted.sort_by(|a, b| display_order(a, b));
    sorted
}
