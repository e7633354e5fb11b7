//! Schema migration for the persisted document.
//!
//! [`migrate`] takes whatever was read from disk and always produces a
//! [`Database`] in the current shape. Old-shaped data is upgraded in place;
//! only a document whose root is not a JSON object is discarded. Unexpected
//! values below the root are treated as absent for that field alone.

pub mod shape;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::item::now;
use crate::model::{
    Database, ItemList, ListKind, PhotoSection, SectionPhotos, Site, APP_VERSION,
    CURRENT_SCHEMA_VERSION,
};
use shape::{
    detect_list_shape, item_from_current, item_from_flat, string_entries, take_string_list,
    take_text, take_timestamp, ListShape,
};

/// What a migration pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Schema version found in the input, if any.
    pub from_version: Option<u64>,
    /// The input root was unusable and replaced by an empty document.
    pub discarded_root: bool,
    pub sites: usize,
    /// Sites that were missing at least one of created_at/notes/photos.
    pub sites_backfilled: usize,
    /// Plain strings upgraded to items.
    pub strings_converted: usize,
    /// Blank or non-string list entries dropped during upgrade.
    pub entries_skipped: usize,
    /// Legacy photo paths newly added to the general bucket.
    pub photos_merged: usize,
    /// Paths moved out of unrecognized photo sections into general.
    pub unknown_section_paths: usize,
}

impl MigrationReport {
    /// True when the structure of the document changed. Restamping the
    /// version fields alone does not count.
    pub fn changed(&self) -> bool {
        self.discarded_root
            || self.sites_backfilled > 0
            || self.strings_converted > 0
            || self.entries_skipped > 0
            || self.photos_merged > 0
            || self.unknown_section_paths > 0
    }
}

/// Upgrades `raw` to the current schema. `None` means nothing was stored.
pub fn migrate(raw: Option<Value>) -> (Database, MigrationReport) {
    let _span = tracing::info_span!("migration.run").entered();
    let mut report = MigrationReport::default();

    let mut root = match raw {
        Some(Value::Object(map)) => map,
        Some(other) => {
            log::warn!(
                "Stored document root is a {}, not an object; starting fresh",
                json_type(&other)
            );
            report.discarded_root = true;
            return (Database::new(), report);
        }
        None => return (Database::new(), report),
    };

    report.from_version = root.get("version").and_then(Value::as_u64);
    root.remove("version");
    root.remove("app_version");

    let created_at = take_timestamp(&mut root, "created_at").unwrap_or_else(now);

    let job_sites = match root.remove("job_sites") {
        Some(Value::Object(sites)) => sites
            .into_iter()
            .map(|(name, raw_site)| {
                let site = migrate_site(&name, raw_site, &mut report);
                (name, site)
            })
            .collect(),
        Some(Value::Null) | None => BTreeMap::new(),
        Some(other) => {
            log::warn!(
                "job_sites is a {}, not an object; treating as empty",
                json_type(&other)
            );
            BTreeMap::new()
        }
    };
    report.sites = job_sites.len();

    let db = Database {
        version: CURRENT_SCHEMA_VERSION,
        created_at,
        app_version: APP_VERSION.to_string(),
        job_sites,
        extra: root.into_iter().collect(),
    };

    if report.changed() {
        log::info!(
            "Migrated database from version {:?}: {} sites, {} backfilled, {} strings converted, {} entries skipped, {} photos merged",
            report.from_version,
            report.sites,
            report.sites_backfilled,
            report.strings_converted,
            report.entries_skipped,
            report.photos_merged
        );
    }

    (db, report)
}

fn migrate_site(name: &str, raw: Value, report: &mut MigrationReport) -> Site {
    let mut map = match raw {
        Value::Object(map) => map,
        other => {
            log::warn!(
                "Site '{}' is a {}, not an object; resetting its fields",
                name,
                json_type(&other)
            );
            Map::new()
        }
    };

    let mut backfilled = false;

    let created_at = take_timestamp(&mut map, "created_at").unwrap_or_else(|| {
        backfilled = true;
        now()
    });
    let notes = take_text(&mut map, "notes").unwrap_or_else(|| {
        backfilled = true;
        String::new()
    });
    let photos = take_string_list(&mut map, "photos").unwrap_or_else(|| {
        backfilled = true;
        Vec::new()
    });
    if backfilled {
        report.sites_backfilled += 1;
    }

    let mut lists: [ItemList; 4] = Default::default();
    for (slot, kind) in lists.iter_mut().zip(ListKind::ALL) {
        *slot = migrate_list(name, kind, map.remove(kind.key()), report);
    }
    let [what_to_do, materials_need, materials_have, to_buy] = lists;

    let mut section_photos = migrate_section_photos(map.remove("section_photos"), report);
    report.photos_merged += union_into(&mut section_photos.general, &photos);

    Site {
        created_at,
        what_to_do,
        materials_need,
        materials_have,
        to_buy,
        photos,
        section_photos,
        notes,
        extra: map.into_iter().collect(),
    }
}

fn migrate_list(
    site: &str,
    kind: ListKind,
    raw: Option<Value>,
    report: &mut MigrationReport,
) -> ItemList {
    match detect_list_shape(raw) {
        ListShape::Empty => ItemList::new(),
        ListShape::Current(entries) => entries
            .into_iter()
            .filter_map(item_from_current)
            .collect::<Vec<_>>()
            .into(),
        ListShape::Flat(entries) => {
            let items: Vec<_> = entries.iter().filter_map(item_from_flat).collect();
            report.strings_converted += items.len();
            report.entries_skipped += entries.len() - items.len();
            items.into()
        }
        ListShape::Invalid(other) => {
            log::warn!(
                "Site '{}' list {} is a {}, not a list; treating as empty",
                site,
                kind,
                json_type(&other)
            );
            report.entries_skipped += 1;
            ItemList::new()
        }
    }
}

fn migrate_section_photos(raw: Option<Value>, report: &mut MigrationReport) -> SectionPhotos {
    let mut photos = SectionPhotos::default();

    let map = match raw {
        Some(Value::Object(map)) => map,
        _ => return photos,
    };

    let mut unknown = Vec::new();
    for (key, value) in map {
        let paths = match value {
            Value::Array(entries) => string_entries(entries),
            _ => continue,
        };
        match PhotoSection::from_key(&key) {
            Some(section) => *photos.bucket_mut(section) = paths,
            None => unknown.extend(paths),
        }
    }

    report.unknown_section_paths += union_into(&mut photos.general, &unknown);
    photos
}

/// Appends each path of `extra` not already in `target`, keeping order of
/// first appearance. Returns how many were added.
fn union_into(target: &mut Vec<String>, extra: &[String]) -> usize {
    let mut added = 0;
    for path in extra {
        if !target.contains(path) {
            target.push(path.clone());
            added += 1;
        }
    }
    added
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
