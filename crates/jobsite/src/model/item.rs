use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort rank used for display ordering. Lower sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            _ => Err(ValidationError::UnknownPriority(s.to_string())),
        }
    }
}

/// A single task, material or to-buy entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub priority: Priority,
    /// Empty string means no link.
    #[serde(default)]
    pub link: String,
    pub created_at: NaiveDateTime,
}

impl Item {
    /// Builds a new item. `text` is trimmed and must not be empty.
    pub fn new(text: &str, priority: Priority, link: Option<&str>) -> Result<Self, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyItemText);
        }

        Ok(Self {
            id: new_item_id(),
            text: text.to_string(),
            done: false,
            priority,
            link: link.map(str::trim).unwrap_or_default().to_string(),
            created_at: now(),
        })
    }

    pub fn link(&self) -> Option<&str> {
        if self.link.is_empty() {
            None
        } else {
            Some(&self.link)
        }
    }

    pub fn toggle_done(&mut self) {
        self.done = !self.done;
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// Case-insensitive containment against text and link. `needle` must
    /// already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle) || self.link.to_lowercase().contains(needle)
    }
}

pub(crate) fn new_item_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub const MIN_ID_PREFIX: usize = 4;

/// Insertion-ordered list of items, addressed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemList(Vec<Item>);

impl ItemList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Validates and appends a new item, returning it.
    pub fn add(
        &mut self,
        text: &str,
        priority: Priority,
        link: Option<&str>,
    ) -> Result<&Item, ValidationError> {
        let item = Item::new(text, priority, link)?;
        self.0.push(item);
        let idx = self.0.len() - 1;
        Ok(&self.0[idx])
    }

    /// Removes the item with `id`. Other items keep their relative order.
    pub fn remove(&mut self, id: &str) -> Option<Item> {
        let pos = self.0.iter().position(|item| item.id == id)?;
        Some(self.0.remove(pos))
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.0.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.0.iter_mut().find(|item| item.id == id)
    }

    pub fn toggle_done(&mut self, id: &str) -> Result<&Item, ValidationError> {
        let item = self
            .get_mut(id)
            .ok_or_else(|| ValidationError::ItemNotFound(id.to_string()))?;
        item.toggle_done();
        Ok(item)
    }

    pub fn set_priority(&mut self, id: &str, priority: Priority) -> Result<&Item, ValidationError> {
        let item = self
            .get_mut(id)
            .ok_or_else(|| ValidationError::ItemNotFound(id.to_string()))?;
        item.set_priority(priority);
        Ok(item)
    }

    /// Resolves a full id, or an unambiguous id prefix of at least
    /// [`MIN_ID_PREFIX`] characters, to the stored id.
    pub fn resolve_id(&self, id_or_prefix: &str) -> Result<String, ValidationError> {
        let needle = id_or_prefix.trim();
        if let Some(item) = self.get(needle) {
            return Ok(item.id.clone());
        }
        if needle.len() < MIN_ID_PREFIX {
            return Err(ValidationError::ItemNotFound(needle.to_string()));
        }

        let mut candidates = self.0.iter().filter(|item| item.id.starts_with(needle));
        match (candidates.next(), candidates.next()) {
            (Some(item), None) => Ok(item.id.clone()),
            (Some(_), Some(_)) => Err(ValidationError::AmbiguousItemId(needle.to_string())),
            (None, _) => Err(ValidationError::ItemNotFound(needle.to_string())),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.0.iter().filter(|item| !item.done).count()
    }
}

impl From<Vec<Item>> for ItemList {
    fn from(items: Vec<Item>) -> Self {
        Self(items)
    }
}

impl<'a> IntoIterator for &'a ItemList {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
