//! Shape detection and lenient readers for previously persisted documents.
//!
//! Everything here works on raw `serde_json::Value`s. Nothing fails: values
//! of an unexpected type read as absent.

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};

use crate::model::item::{new_item_id, now};
use crate::model::{Item, Priority};

/// Shape of a stored item list.
#[derive(Debug, PartialEq)]
pub enum ListShape {
    /// Missing, null, or an empty array.
    Empty,
    /// First element is an object with a `text` field: already item objects.
    Current(Vec<Value>),
    /// Anything else that is an array: first generation plain strings.
    Flat(Vec<Value>),
    /// Present but not an array.
    Invalid(Value),
}

pub fn detect_list_shape(value: Option<Value>) -> ListShape {
    match value {
        None | Some(Value::Null) => ListShape::Empty,
        Some(Value::Array(entries)) if entries.is_empty() => ListShape::Empty,
        Some(Value::Array(entries)) => {
            let current = entries
                .first()
                .and_then(Value::as_object)
                .is_some_and(|first| first.contains_key("text"));
            if current {
                ListShape::Current(entries)
            } else {
                ListShape::Flat(entries)
            }
        }
        Some(other) => ListShape::Invalid(other),
    }
}

/// Parses the timestamp formats the app has written: naive ISO-8601 with
/// optional fractional seconds, and RFC 3339 with an offset.
pub fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    let s = value.as_str()?.trim();
    s.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
}

pub fn take_timestamp(map: &mut Map<String, Value>, key: &str) -> Option<NaiveDateTime> {
    map.remove(key).as_ref().and_then(parse_timestamp)
}

/// Reads a free-text field. Non-string scalars keep their JSON rendering so
/// no user text is dropped.
pub fn take_text(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Reads an array of strings, skipping entries of any other type.
/// Returns `None` when the field is missing or not an array.
pub fn take_string_list(map: &mut Map<String, Value>, key: &str) -> Option<Vec<String>> {
    match map.remove(key)? {
        Value::Array(entries) => Some(string_entries(entries)),
        _ => None,
    }
}

pub fn string_entries(entries: Vec<Value>) -> Vec<String> {
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

/// Converts an element of an already-current list into an [`Item`] without
/// re-validating it. Missing ids and unreadable timestamps are filled in;
/// everything present is kept as stored.
pub fn item_from_current(entry: Value) -> Option<Item> {
    let mut map = match entry {
        Value::Object(map) => map,
        // A stray string inside a current list is still user text.
        Value::String(s) if !s.trim().is_empty() => {
            return Item::new(&s, Priority::Medium, None).ok();
        }
        _ => return None,
    };

    let id = match map.remove("id") {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => new_item_id(),
    };
    let text = take_text(&mut map, "text").unwrap_or_default();
    let done = map.remove("done").and_then(|v| v.as_bool()).unwrap_or(false);
    let priority = map
        .remove("priority")
        .and_then(|v| v.as_str().and_then(|s| s.parse::<Priority>().ok()))
        .unwrap_or_default();
    let link = take_text(&mut map, "link").unwrap_or_default();
    let created_at = take_timestamp(&mut map, "created_at").unwrap_or_else(now);

    Some(Item {
        id,
        text,
        done,
        priority,
        link,
        created_at,
    })
}

/// Converts a first-generation plain string into a new [`Item`]. Blank and
/// non-string entries yield `None`.
pub fn item_from_flat(entry: &Value) -> Option<Item> {
    let text = entry.as_str()?;
    Item::new(text, Priority::Medium, None).ok()
}
