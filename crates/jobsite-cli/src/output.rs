//! Plain-text and JSON rendering of handler responses.

use std::fmt::Write;

use jobsite::app::{ItemRef, SiteListing, SiteView};
use jobsite::{ApiResponse, Item, Notice, NoticeLevel, PhotoPreview, SearchHit};
use serde::Serialize;

const SHORT_ID: usize = 8;

pub struct Printer {
    json: bool,
}

impl Printer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Notices go to stderr so stdout stays pipeable.
    pub fn notice(&self, notice: &Notice) {
        let prefix = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
        };
        eprintln!("{}: {}", prefix, notice.message);
    }

    /// Prints `response` and returns its success flag.
    pub fn response<T, F>(&self, response: &ApiResponse<T>, render: F) -> bool
    where
        T: Serialize,
        F: Fn(&T) -> String,
    {
        if self.json {
            match serde_json::to_string_pretty(response) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to encode response: {}", e),
            }
            return response.success;
        }

        if let Some(data) = &response.data {
            let text = render(data);
            if !text.is_empty() {
                println!("{}", text.trim_end());
            }
        }
        if let Some(notice) = &response.notice {
            self.notice(notice);
        }
        if let Some(error) = &response.error {
            eprintln!("warning: {}", error);
        }
        response.success
    }
}

fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID).unwrap_or(id)
}

pub fn item_line(item: &Item) -> String {
    let mut line = format!(
        "[{}] {:<6} {}  ({})",
        if item.done { "x" } else { " " },
        item.priority.as_str(),
        item.text,
        short_id(&item.id)
    );
    if let Some(link) = item.link() {
        let _ = write!(line, "  -> {}", link);
    }
    line
}

pub fn item_ref(item: &ItemRef) -> String {
    format!("{}: {}", item.list.label(), item_line(&item.item))
}

pub fn site_list(sites: &[SiteListing]) -> String {
    if sites.is_empty() {
        return "No job sites yet. Create one with `jobsite site create <name>`.".to_string();
    }

    let width = sites.iter().map(|s| s.name.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for site in sites {
        let s = &site.summary;
        let _ = writeln!(
            out,
            "{:<width$}  todo {}/{}  need {}  have {}  buy {}/{}  photos {}",
            site.name,
            s.what_to_do_open,
            s.what_to_do,
            s.materials_need,
            s.materials_have,
            s.to_buy_open,
            s.to_buy,
            s.photos,
            width = width
        );
    }
    out
}

pub fn site_view(view: &SiteView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (since {})", view.name, view.created_at.format("%Y-%m-%d"));

    for list in &view.lists {
        if view.filtered && list.items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{} ({})", list.label, list.items.len());
        for item in &list.items {
            let _ = writeln!(out, "  {}", item_line(item));
        }
    }

    let show_notes = match view.notes_match {
        Some(matched) => matched,
        None => !view.notes.is_empty(),
    };
    if show_notes {
        let _ = writeln!(out, "\nNotes\n{}", view.notes);
    }
    if view.filtered && view.lists.iter().all(|l| l.items.is_empty()) && !show_notes {
        let _ = writeln!(out, "\nNo matches.");
    }
    out
}

pub fn numbered(paths: &[String]) -> String {
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| format!("{:>3}  {}", i, path))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn previews(previews: &[PhotoPreview]) -> String {
    previews
        .iter()
        .map(|p| match p {
            PhotoPreview::Image {
                path,
                width,
                height,
                mime,
            } => format!("{}  {}x{}  {}", path, width, height, mime),
            PhotoPreview::RawPath { path } => format!("{}  (cannot display)", path),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn search_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| format!("{:>2}. {}\n    {}", i + 1, hit.title, hit.url))
        .collect::<Vec<_>>()
        .join("\n")
}
