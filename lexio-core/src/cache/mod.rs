// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content cache module
//!
//! The in-memory store that serves every read, and the disk layer that
//! makes it survive restarts:
//! - Localized entries (tabs) and language-independent entries (colors,
//!   images) in one nested map
//! - Structured store records keyed by record ID
//! - Atomic JSON snapshots with self-healing loads

mod persistence;
mod store;

pub use persistence::{CacheError, CacheSnapshot, Credentials, Persistence};
pub use store::{ContentStore, EntryMap, FieldValue, StoreRecord, NEUTRAL_LANG};
