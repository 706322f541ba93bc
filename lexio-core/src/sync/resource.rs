// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Resource identity
//!
//! Everything the engine synchronizes is addressed as a [`Resource`]:
//! a translation tab, the color set, the global image set, or a data
//! store. Each resource has a stable string slug used for dedup sets,
//! the known-resource registry and the disk format.

use std::fmt;

/// Reserved remote ID for the color set.
pub const COLORS_ID: &str = "__colors__";

/// Reserved remote ID for the global image set.
pub const IMAGES_ID: &str = "__images__";

/// Wildcard remote ID in push frames meaning "every known resource".
pub const WILDCARD_ID: &str = "__ALL__";

/// A synchronizable content resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    /// A translation tab identified by its CMS tab ID.
    Tab(String),
    /// App color definitions.
    Colors,
    /// Global image URLs.
    Images,
    /// A data store of structured records.
    Store(String),
}

impl Resource {
    /// Creates a tab resource.
    pub fn tab(id: impl Into<String>) -> Self {
        Resource::Tab(id.into())
    }

    /// Creates a data store resource.
    pub fn store(id: impl Into<String>) -> Self {
        Resource::Store(id.into())
    }

    /// Stable slug identifying this resource.
    ///
    /// Slugs key the in-flight set, the known-resource registry and the
    /// persisted cache, so their format must stay stable across releases.
    pub fn slug(&self) -> String {
        match self {
            Resource::Tab(id) => format!("tab:{}", id),
            Resource::Colors => COLORS_ID.to_string(),
            Resource::Images => IMAGES_ID.to_string(),
            Resource::Store(id) => format!("store:{}", id),
        }
    }

    /// Parses a slug produced by [`Resource::slug`].
    pub fn from_slug(slug: &str) -> Option<Resource> {
        if slug == COLORS_ID {
            return Some(Resource::Colors);
        }
        if slug == IMAGES_ID {
            return Some(Resource::Images);
        }
        if let Some(id) = slug.strip_prefix("tab:") {
            return Some(Resource::Tab(id.to_string()));
        }
        if let Some(id) = slug.strip_prefix("store:") {
            return Some(Resource::Store(id.to_string()));
        }
        None
    }

    /// Remote ID used in API paths and push frames.
    pub fn remote_id(&self) -> &str {
        match self {
            Resource::Tab(id) | Resource::Store(id) => id,
            Resource::Colors => COLORS_ID,
            Resource::Images => IMAGES_ID,
        }
    }

    /// True for kinds whose values vary by language.
    ///
    /// Colors and images are language independent; their values live in
    /// the neutral language slot of the store.
    pub fn is_localized(&self) -> bool {
        matches!(self, Resource::Tab(_))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}
