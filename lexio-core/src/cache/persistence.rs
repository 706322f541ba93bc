// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Disk persistence
//!
//! Writes the cache snapshot, the known-resource registry and the API
//! credentials as JSON files under the storage directory. All writes go
//! through a temp-file-then-rename so a crash never leaves a partial
//! file. Loads self-heal: a corrupt file is deleted and treated as
//! absent, so a damaged cache costs a resync, never a startup failure.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::store::ContentStore;

const SNAPSHOT_FILE: &str = "cache.json";
const REGISTRY_FILE: &str = "known_resources.json";
const CREDENTIALS_FILE: &str = "credentials.json";

/// API credentials supplied by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Project API key.
    pub api_key: String,
    /// Secret paired with the key.
    pub api_secret: String,
}

impl Credentials {
    /// Creates credentials from a key/secret pair.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Credentials {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

/// Durable image of the cache: content plus the active language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Active language at the time of the save.
    pub language: String,
    /// The cached content.
    pub content: ContentStore,
}

/// File-backed persistence for the content cache.
#[derive(Debug, Clone)]
pub struct Persistence {
    dir: PathBuf,
}

impl Persistence {
    /// Creates a persistence layer rooted at the given storage path.
    ///
    /// Creates a `lexio/` subdirectory if it doesn't exist.
    pub fn new(storage_path: &Path) -> Result<Self, CacheError> {
        let dir = storage_path.join("lexio");
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Saves the cache snapshot atomically.
    pub fn save_snapshot(&self, snapshot: &CacheSnapshot) -> Result<(), CacheError> {
        let data = serde_json::to_string_pretty(snapshot)?;
        atomic_write(&self.dir.join(SNAPSHOT_FILE), data.as_bytes())
    }

    /// Loads the cache snapshot, discarding it if corrupt.
    pub fn load_snapshot(&self) -> Option<CacheSnapshot> {
        self.load_or_discard(SNAPSHOT_FILE)
    }

    /// Saves the known-resource registry atomically.
    pub fn save_registry(&self, known: &BTreeSet<String>) -> Result<(), CacheError> {
        let data = serde_json::to_string_pretty(known)?;
        atomic_write(&self.dir.join(REGISTRY_FILE), data.as_bytes())
    }

    /// Loads the known-resource registry; empty if absent or corrupt.
    pub fn load_registry(&self) -> BTreeSet<String> {
        self.load_or_discard(REGISTRY_FILE).unwrap_or_default()
    }

    /// Saves the API credentials atomically.
    pub fn save_credentials(&self, credentials: &Credentials) -> Result<(), CacheError> {
        let data = serde_json::to_string_pretty(credentials)?;
        atomic_write(&self.dir.join(CREDENTIALS_FILE), data.as_bytes())
    }

    /// Loads the API credentials, discarding them if corrupt.
    pub fn load_credentials(&self) -> Option<Credentials> {
        self.load_or_discard(CREDENTIALS_FILE)
    }

    /// Removes the snapshot and registry files.
    ///
    /// Credentials survive a cache clear; they are configuration, not
    /// cached content.
    pub fn clear(&self) -> Result<(), CacheError> {
        for name in [SNAPSHOT_FILE, REGISTRY_FILE] {
            let path = self.dir.join(name);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Directory holding the persisted files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load_or_discard<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.dir.join(name);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Discarding unreadable {}: {}", name, e);
                let _ = fs::remove_file(&path);
                return None;
            }
        };
        match serde_json::from_str(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding corrupt {}: {}", name, e);
                let _ = fs::remove_file(&path);
                None
            }
        }
    }
}

/// Atomic file write (write to temp, then rename).
///
/// Either the old content remains or the new content is fully written;
/// a crash mid-write never produces a partial file.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), CacheError> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, data)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Errors that can occur in the persistence layer.
#[derive(Debug, Error)]
pub enum CacheError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
