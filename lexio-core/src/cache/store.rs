// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory content store
//!
//! Holds every cached value the engine serves: localized entries keyed
//! by resource slug, item key and language, plus structured records
//! keyed by store ID and record ID. The store is plain data with no
//! locking of its own; the sync engine serializes all access through
//! its coordinating lock.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Language slot for values that do not vary by language (colors, images).
pub const NEUTRAL_LANG: &str = "*";

/// Incoming entries for one resource: item key to per-language values.
pub type EntryMap = HashMap<String, HashMap<String, String>>;

/// A single field value inside a store record.
///
/// The backend delivers record fields as loosely typed JSON; the
/// untagged representation mirrors that wire shape directly. `Null`
/// must stay the first variant so JSON `null` matches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicit null.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integer number.
    Int(i64),
    /// Floating point number.
    Double(f64),
    /// Plain text, identical in every language.
    Text(String),
    /// Per-language text keyed by language code.
    Localized(HashMap<String, String>),
}

impl FieldValue {
    /// Resolves a textual value for the given language.
    ///
    /// Plain text resolves for any language; localized text resolves only
    /// when the language is present. Non-text values resolve to `None`.
    pub fn resolve(&self, language: &str) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            FieldValue::Localized(values) => values.get(language).map(String::as_str),
            _ => None,
        }
    }

    /// Returns the boolean value, if this field is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer value, if this field is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the numeric value, widening integers to floats.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            FieldValue::Int(value) => Some(*value as f64),
            FieldValue::Double(value) => Some(*value),
            _ => None,
        }
    }

    /// True if the field is an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// A structured record from a data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    /// Unique record ID within its store.
    pub id: String,
    /// ISO 8601 creation timestamp as delivered by the backend.
    pub created_at: String,
    /// ISO 8601 timestamp of the last modification.
    pub updated_at: String,
    /// Field values keyed by field name.
    pub fields: HashMap<String, FieldValue>,
}

impl StoreRecord {
    /// Resolves a textual field for the given language.
    pub fn text_field(&self, name: &str, language: &str) -> Option<&str> {
        self.fields.get(name)?.resolve(language)
    }
}

/// The multi-dimensional content cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentStore {
    /// resource slug -> item key -> language -> value
    entries: BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>,
    /// store ID -> record ID -> record
    records: BTreeMap<String, BTreeMap<String, StoreRecord>>,
}

impl ContentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a single value. Total: absent anything yields `None`.
    pub fn get(&self, slug: &str, key: &str, language: &str) -> Option<&str> {
        self.entries
            .get(slug)?
            .get(key)?
            .get(language)
            .map(String::as_str)
    }

    /// Returns all values of a resource resolved for one language.
    ///
    /// Keys without a value in that language are omitted.
    pub fn get_all(&self, slug: &str, language: &str) -> HashMap<String, String> {
        let Some(items) = self.entries.get(slug) else {
            return HashMap::new();
        };
        items
            .iter()
            .filter_map(|(key, langs)| langs.get(language).map(|v| (key.clone(), v.clone())))
            .collect()
    }

    /// Merges incoming entries into a resource.
    ///
    /// Additive: keys and languages the payload does not mention keep
    /// their cached values. A key present in the payload overwrites only
    /// the languages the payload carries for it.
    pub fn merge_entries(&mut self, slug: &str, incoming: EntryMap) {
        let items = self.entries.entry(slug.to_string()).or_default();
        for (key, langs) in incoming {
            let slot = items.entry(key).or_default();
            for (language, value) in langs {
                slot.insert(language, value);
            }
        }
    }

    /// Merges incoming records into a store, keyed by record ID.
    ///
    /// Additive: records absent from the payload stay cached.
    pub fn merge_records(&mut self, store: &str, incoming: Vec<StoreRecord>) {
        let slot = self.records.entry(store.to_string()).or_default();
        for record in incoming {
            slot.insert(record.id.clone(), record);
        }
    }

    /// Returns the records of a store, ordered by record ID.
    pub fn records(&self, store: &str) -> Vec<StoreRecord> {
        self.records
            .get(store)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Looks up a single record by ID.
    pub fn record(&self, store: &str, id: &str) -> Option<&StoreRecord> {
        self.records.get(store)?.get(id)
    }

    /// True if the resource has cached entries.
    pub fn contains_entries(&self, slug: &str) -> bool {
        self.entries.get(slug).is_some_and(|items| !items.is_empty())
    }

    /// True if the store has cached records.
    pub fn has_records(&self, store: &str) -> bool {
        self.records.get(store).is_some_and(|m| !m.is_empty())
    }

    /// Slugs of every resource with cached entries.
    pub fn entry_slugs(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// IDs of every store with cached records.
    pub fn record_stores(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    /// Drops all cached content.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.records.clear();
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.records.is_empty()
    }
}
