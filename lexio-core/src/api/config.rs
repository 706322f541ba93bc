// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration for a Lexio instance

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a [`Lexio`](crate::Lexio) instance.
#[derive(Debug, Clone)]
pub struct LexioConfig {
    /// Local directory for cache and credential files.
    pub storage_path: PathBuf,

    /// Base URL of the content API.
    pub api_url: String,

    /// Project identifier issued by the CMS.
    pub project_id: String,

    /// Language used until the app selects one and no snapshot exists.
    pub default_language: String,

    /// Interval between background poll passes.
    ///
    /// Clamped to the scheduler's bounds (60s to 600s) when the poller
    /// starts, so a misconfigured value cannot hammer the backend or
    /// starve the cache.
    pub poll_interval: Duration,

    /// HTTP timeout for API requests.
    pub request_timeout: Duration,

    /// Delay used to coalesce bursts of disk writes into one save.
    pub save_debounce: Duration,
}

impl Default for LexioConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("."),
            api_url: "https://api.lexio.app/v1".to_string(),
            project_id: String::new(),
            default_language: "en".to_string(),
            poll_interval: Duration::from_secs(300), // 5 minutes
            request_timeout: Duration::from_secs(15),
            save_debounce: Duration::from_millis(300),
        }
    }
}

impl LexioConfig {
    /// Creates a configuration for a project.
    pub fn new(
        api_url: impl Into<String>,
        project_id: impl Into<String>,
        storage_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            project_id: project_id.into(),
            storage_path: storage_path.into(),
            ..Default::default()
        }
    }

    /// Sets the startup language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    /// Sets the poll interval (clamped when the scheduler starts).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the HTTP request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
