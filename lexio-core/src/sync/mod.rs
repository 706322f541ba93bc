// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Synchronization
//!
//! Resource identity, the sync engine and the poll scheduler.

mod engine;
mod poller;
mod resource;

pub(crate) use engine::SyncEngine;
pub(crate) use poller::spawn_poller;
pub use poller::{clamp_poll_interval, MAX_POLL_INTERVAL, MIN_POLL_INTERVAL};
pub use resource::{Resource, COLORS_ID, IMAGES_ID, WILDCARD_ID};
