// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire types for the content API
//!
//! Response shapes as the backend delivers them, plus the conversions
//! into the cache's domain types. The backend uses camelCase field
//! names throughout.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::cache::{EntryMap, FieldValue, StoreRecord, NEUTRAL_LANG};

/// Body of the authentication request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthRequest<'a> {
    pub api_key: &'a str,
    pub api_secret: &'a str,
}

/// Successful authentication response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Session bearer token for subsequent requests.
    pub token: String,
    /// Tab IDs defined in the project.
    #[serde(default)]
    pub tabs: Vec<String>,
    /// Data store IDs defined in the project.
    #[serde(default)]
    pub stores: Vec<String>,
    /// Languages the project publishes content in.
    #[serde(default)]
    pub available_languages: Vec<String>,
}

/// An authenticated session with the backend.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session bearer token.
    pub token: String,
    /// Tab IDs defined in the project.
    pub tabs: Vec<String>,
    /// Store IDs defined in the project; also used to classify push IDs.
    pub store_ids: BTreeSet<String>,
    /// Languages the project publishes content in.
    pub languages: Vec<String>,
}

impl From<AuthResponse> for Session {
    fn from(auth: AuthResponse) -> Self {
        Session {
            token: auth.token,
            tabs: auth.tabs,
            store_ids: auth.stores.into_iter().collect(),
            languages: auth.available_languages,
        }
    }
}

/// Content payload for one resource, already in cache shape.
#[derive(Debug, Clone)]
pub enum ResourcePayload {
    /// Entries of a localized or language-independent resource.
    Entries(EntryMap),
    /// Records of a data store.
    Records(Vec<StoreRecord>),
}

/// Localized resource response: per-language values for each key.
#[derive(Debug, Deserialize)]
pub(crate) struct LocalizedResponse {
    #[serde(default)]
    pub items: Vec<LocalizedItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocalizedItem {
    pub key: String,
    #[serde(default)]
    pub values: HashMap<String, String>,
}

impl LocalizedResponse {
    pub fn into_entries(self) -> EntryMap {
        self.items
            .into_iter()
            .map(|item| (item.key, item.values))
            .collect()
    }
}

/// Color set response: one hex value per key.
#[derive(Debug, Deserialize)]
pub(crate) struct ColorsResponse {
    #[serde(default)]
    pub items: Vec<ColorItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ColorItem {
    pub key: String,
    pub value: String,
}

impl ColorsResponse {
    /// Converts into entries under the neutral language slot.
    pub fn into_entries(self) -> EntryMap {
        self.items
            .into_iter()
            .map(|item| {
                let mut slot = HashMap::new();
                slot.insert(NEUTRAL_LANG.to_string(), item.value);
                (item.key, slot)
            })
            .collect()
    }
}

/// Image set response: one URL per key.
#[derive(Debug, Deserialize)]
pub(crate) struct ImagesResponse {
    #[serde(default)]
    pub items: Vec<ImageItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageItem {
    pub key: String,
    pub url: String,
}

impl ImagesResponse {
    /// Converts into entries under the neutral language slot.
    pub fn into_entries(self) -> EntryMap {
        self.items
            .into_iter()
            .map(|item| {
                let mut slot = HashMap::new();
                slot.insert(NEUTRAL_LANG.to_string(), item.url);
                (item.key, slot)
            })
            .collect()
    }
}

/// Data store response: full record list.
#[derive(Debug, Deserialize)]
pub(crate) struct StoreResponse {
    #[serde(default)]
    pub items: Vec<StoreItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoreItem {
    pub id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub data: HashMap<String, FieldValue>,
}

impl StoreItem {
    pub fn into_record(self) -> StoreRecord {
        StoreRecord {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            fields: self.data,
        }
    }
}

/// Validates a `#rrggbb` hex color string.
///
/// Color values are server controlled; a bad value is kept but flagged
/// so broken styling can be traced to the CMS entry.
pub fn is_valid_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
