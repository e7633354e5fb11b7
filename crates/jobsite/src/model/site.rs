use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::model::item::{now, ItemList};

/// The four typed item lists every site carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    WhatToDo,
    MaterialsNeed,
    MaterialsHave,
    ToBuy,
}

impl ListKind {
    pub const ALL: [ListKind; 4] = [
        ListKind::WhatToDo,
        ListKind::MaterialsNeed,
        ListKind::MaterialsHave,
        ListKind::ToBuy,
    ];

    /// Field name in the persisted document.
    pub fn key(self) -> &'static str {
        match self {
            ListKind::WhatToDo => "what_to_do",
            ListKind::MaterialsNeed => "materials_need",
            ListKind::MaterialsHave => "materials_have",
            ListKind::ToBuy => "to_buy",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ListKind::WhatToDo => "What To Do",
            ListKind::MaterialsNeed => "Materials Needed",
            ListKind::MaterialsHave => "Materials Have",
            ListKind::ToBuy => "To Buy",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ListKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "what_to_do" | "todo" => Ok(ListKind::WhatToDo),
            "materials_need" | "need" => Ok(ListKind::MaterialsNeed),
            "materials_have" | "have" => Ok(ListKind::MaterialsHave),
            "to_buy" | "buy" => Ok(ListKind::ToBuy),
            _ => Err(ValidationError::UnknownList(s.to_string())),
        }
    }
}

/// Fixed photo buckets of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoSection {
    WhatToDo,
    Materials,
    ToBuy,
    Notes,
    General,
}

impl PhotoSection {
    pub const ALL: [PhotoSection; 5] = [
        PhotoSection::WhatToDo,
        PhotoSection::Materials,
        PhotoSection::ToBuy,
        PhotoSection::Notes,
        PhotoSection::General,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PhotoSection::WhatToDo => "what_to_do",
            PhotoSection::Materials => "materials",
            PhotoSection::ToBuy => "to_buy",
            PhotoSection::Notes => "notes",
            PhotoSection::General => "general",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.key() == key)
    }
}

impl fmt::Display for PhotoSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PhotoSection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::from_key(&normalized).ok_or_else(|| ValidationError::UnknownSection(s.to_string()))
    }
}

/// Photo path references grouped by section. All five buckets always exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPhotos {
    #[serde(default)]
    pub what_to_do: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub to_buy: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub general: Vec<String>,
}

impl SectionPhotos {
    pub fn bucket(&self, section: PhotoSection) -> &Vec<String> {
        match section {
            PhotoSection::WhatToDo => &self.what_to_do,
            PhotoSection::Materials => &self.materials,
            PhotoSection::ToBuy => &self.to_buy,
            PhotoSection::Notes => &self.notes,
            PhotoSection::General => &self.general,
        }
    }

    pub fn bucket_mut(&mut self, section: PhotoSection) -> &mut Vec<String> {
        match section {
            PhotoSection::WhatToDo => &mut self.what_to_do,
            PhotoSection::Materials => &mut self.materials,
            PhotoSection::ToBuy => &mut self.to_buy,
            PhotoSection::Notes => &mut self.notes,
            PhotoSection::General => &mut self.general,
        }
    }

    /// Every path across sections in section order, first appearance wins.
    pub fn all_paths(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for section in PhotoSection::ALL {
            for path in self.bucket(section) {
                if !seen.contains(&path.as_str()) {
                    seen.push(path.as_str());
                }
            }
        }
        seen
    }

    pub fn total(&self) -> usize {
        PhotoSection::ALL
            .into_iter()
            .map(|section| self.bucket(section).len())
            .sum()
    }
}

/// A named job site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub what_to_do: ItemList,
    #[serde(default)]
    pub materials_need: ItemList,
    #[serde(default)]
    pub materials_have: ItemList,
    #[serde(default)]
    pub to_buy: ItemList,
    /// Flat photo list from the first schema generation. Mirrored into
    /// `section_photos.general` on load.
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub section_photos: SectionPhotos,
    #[serde(default)]
    pub notes: String,
    /// Fields this version does not know about, carried through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Site {
    fn default() -> Self {
        Self::new()
    }
}

impl Site {
    pub fn new() -> Self {
        Self {
            created_at: now(),
            what_to_do: ItemList::new(),
            materials_need: ItemList::new(),
            materials_have: ItemList::new(),
            to_buy: ItemList::new(),
            photos: Vec::new(),
            section_photos: SectionPhotos::default(),
            notes: String::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn list(&self, kind: ListKind) -> &ItemList {
        match kind {
            ListKind::WhatToDo => &self.what_to_do,
            ListKind::MaterialsNeed => &self.materials_need,
            ListKind::MaterialsHave => &self.materials_have,
            ListKind::ToBuy => &self.to_buy,
        }
    }

    pub fn list_mut(&mut self, kind: ListKind) -> &mut ItemList {
        match kind {
            ListKind::WhatToDo => &mut self.what_to_do,
            ListKind::MaterialsNeed => &mut self.materials_need,
            ListKind::MaterialsHave => &mut self.materials_have,
            ListKind::ToBuy => &mut self.to_buy,
        }
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.notes = notes.to_string();
    }

    /// Appends a line to the notes, separating it from existing text.
    pub fn append_notes(&mut self, line: &str) {
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }
        if !self.notes.is_empty() && !self.notes.ends_with('\n') {
            self.notes.push('\n');
        }
        self.notes.push_str(line);
    }

    /// Drops the photo reference at `index` in `section`. The file itself
    /// stays on disk. Removing from `general` also drops the path from the
    /// legacy list, otherwise the next load would mirror it back.
    pub fn remove_photo(
        &mut self,
        section: PhotoSection,
        index: usize,
    ) -> Result<String, ValidationError> {
        let removed = remove_photo(self.section_photos.bucket_mut(section), index)?;
        if section == PhotoSection::General && !self.section_photos.general.contains(&removed) {
            self.photos.retain(|p| p != &removed);
        }
        Ok(removed)
    }

    pub fn summary(&self) -> SiteSummary {
        SiteSummary {
            what_to_do: self.what_to_do.len(),
            what_to_do_open: self.what_to_do.open_count(),
            materials_need: self.materials_need.len(),
            materials_have: self.materials_have.len(),
            to_buy: self.to_buy.len(),
            to_buy_open: self.to_buy.open_count(),
            photos: self.section_photos.all_paths().len(),
        }
    }
}

/// Removes the path at `index` from a photo bucket.
pub fn remove_photo(bucket: &mut Vec<String>, index: usize) -> Result<String, ValidationError> {
    if index >= bucket.len() {
        return Err(ValidationError::PhotoIndexOutOfRange {
            index,
            len: bucket.len(),
        });
    }
    Ok(bucket.remove(index))
}

/// Dashboard counts for one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SiteSummary {
    pub what_to_do: usize,
    pub what_to_do_open: usize,
    pub materials_need: usize,
    pub materials_have: usize,
    pub to_buy: usize,
    pub to_buy_open: usize,
    pub photos: usize,
}
