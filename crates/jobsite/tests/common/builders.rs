//! Builders for stored documents in the shapes older releases wrote.

#![allow(dead_code)]

use serde_json::{json, Map, Value};

/// Builder for one site entry of a stored document.
pub struct SiteDocBuilder {
    fields: Map<String, Value>,
}

impl SiteDocBuilder {
    /// A site with no fields at all, as the earliest releases wrote them.
    pub fn bare() -> Self {
        Self { fields: Map::new() }
    }

    /// A site with every field present and empty.
    pub fn current() -> Self {
        Self::bare()
            .created_at("2024-03-01T09:00:00")
            .notes("")
            .photos(&[])
            .section_photos(json!({
                "what_to_do": [], "materials": [], "to_buy": [], "notes": [], "general": []
            }))
            .raw("what_to_do", json!([]))
            .raw("materials_need", json!([]))
            .raw("materials_have", json!([]))
            .raw("to_buy", json!([]))
    }

    pub fn created_at(self, ts: &str) -> Self {
        self.raw("created_at", json!(ts))
    }

    pub fn notes(self, notes: &str) -> Self {
        self.raw("notes", json!(notes))
    }

    pub fn photos(self, paths: &[&str]) -> Self {
        self.raw("photos", json!(paths))
    }

    pub fn section_photos(self, sections: Value) -> Self {
        self.raw("section_photos", sections)
    }

    /// A list stored as plain strings.
    pub fn flat_list(self, key: &str, entries: &[&str]) -> Self {
        self.raw(key, json!(entries))
    }

    /// A list stored as full item objects.
    pub fn items(self, key: &str, items: Vec<Value>) -> Self {
        self.raw(key, Value::Array(items))
    }

    pub fn raw(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Builder for a whole stored document.
pub struct DocBuilder {
    root: Map<String, Value>,
    sites: Map<String, Value>,
}

impl DocBuilder {
    pub fn new() -> Self {
        Self {
            root: Map::new(),
            sites: Map::new(),
        }
    }

    pub fn version(mut self, version: u64) -> Self {
        self.root.insert("version".to_string(), json!(version));
        self
    }

    pub fn root_field(mut self, key: &str, value: Value) -> Self {
        self.root.insert(key.to_string(), value);
        self
    }

    pub fn site(mut self, name: &str, site: SiteDocBuilder) -> Self {
        self.sites.insert(name.to_string(), site.build());
        self
    }

    pub fn build(mut self) -> Value {
        self.root
            .insert("job_sites".to_string(), Value::Object(self.sites));
        Value::Object(self.root)
    }
}

/// A stored item object.
pub fn item_doc(id: &str, text: &str, done: bool, priority: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "text": text,
        "done": done,
        "priority": priority,
        "link": "",
        "created_at": created_at
    })
}
