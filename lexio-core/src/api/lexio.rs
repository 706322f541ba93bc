// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Lexio client
//!
//! Main entry point for the Lexio SDK.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tracing::info;

use crate::cache::{Credentials, Persistence, StoreRecord};
use crate::realtime::{spawn_listener, ChannelTransport};
use crate::remote::{BearerSigner, Gateway, RequestSigner};
use crate::sync::{spawn_poller, Resource, SyncEngine};

use super::config::LexioConfig;
use super::error::{LexioError, LexioResult};
use super::events::{CallbackHandler, HandlerId, ResourceChanged, ResourceUpdate, UpdateHandler};

/// Capacity of the change broadcast. A receiver that falls further
/// behind sees a lag error and should re-read the cache.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Main Lexio client.
///
/// One instance per project. It owns the content cache, keeps it in
/// sync with the backend and delivers updates to the application. All
/// read accessors are total and non-blocking: they answer from the
/// cache immediately and let synchronization catch up in the
/// background.
///
/// # Example
///
/// ```ignore
/// use lexio_core::{Lexio, LexioConfig, Resource};
///
/// let lexio = Lexio::new(LexioConfig::new(
///     "https://api.lexio.app/v1",
///     "my-project",
///     "/var/lib/myapp",
/// ))?;
/// lexio.configure("api-key", "api-secret")?;
///
/// // Total read: empty string until the tab has synced.
/// let title = lexio.translation("title", "home");
///
/// lexio.on_updated(&Resource::tab("home"), |update| {
///     println!("home changed: {:?}", update.payload);
/// });
///
/// lexio.set_language("fr", false).await;
/// ```
pub struct Lexio {
    engine: SyncEngine,
    connected: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
    stopped: AtomicBool,
}

impl Lexio {
    /// Creates a client with the default bearer signer and no realtime
    /// channel. Updates then arrive through polling alone.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: LexioConfig) -> LexioResult<Self> {
        Self::build(config, Arc::new(BearerSigner), None)
    }

    /// Creates a client wired to a realtime channel transport.
    pub fn with_transport(
        config: LexioConfig,
        transport: Box<dyn ChannelTransport>,
    ) -> LexioResult<Self> {
        Self::build(config, Arc::new(BearerSigner), Some(transport))
    }

    /// Creates a client with a custom request signer and no realtime
    /// channel.
    pub fn with_signer(config: LexioConfig, signer: Arc<dyn RequestSigner>) -> LexioResult<Self> {
        Self::build(config, signer, None)
    }

    fn build(
        config: LexioConfig,
        signer: Arc<dyn RequestSigner>,
        transport: Option<Box<dyn ChannelTransport>>,
    ) -> LexioResult<Self> {
        let runtime = Handle::try_current().map_err(|_| {
            LexioError::Configuration("Lexio must be created inside a tokio runtime".to_string())
        })?;
        let persistence = Persistence::new(&config.storage_path)?;
        let gateway = Gateway::new(&config, signer.clone())?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let poll_interval = config.poll_interval;

        let engine = SyncEngine::start(config, gateway, persistence, signer, changes, runtime);

        let (shutdown, shutdown_rx) = watch::channel(false);
        let poll_engine = engine.clone();
        spawn_poller(poll_interval, shutdown_rx.clone(), move || {
            poll_engine.sync_detached()
        });

        let connected = Arc::new(AtomicBool::new(false));
        if let Some(transport) = transport {
            spawn_listener(engine.clone(), transport, shutdown_rx, connected.clone());
        }

        Ok(Lexio {
            engine,
            connected,
            shutdown,
            stopped: AtomicBool::new(false),
        })
    }

    // === Configuration ===

    /// Stores API credentials and starts a catch-up sync. Content
    /// accessors work before this is called; they serve cached or
    /// empty values until credentials arrive.
    pub fn configure(&self, api_key: &str, api_secret: &str) -> LexioResult<()> {
        self.engine.configure(Credentials::new(api_key, api_secret))?;
        Ok(())
    }

    /// The active configuration.
    pub fn config(&self) -> &LexioConfig {
        self.engine.config()
    }

    // === Translations ===

    /// Translation for `key` in the given tab under the active
    /// language. Returns the empty string when the key is unknown.
    pub fn translation(&self, key: &str, tab: &str) -> String {
        self.engine
            .entry(&Resource::tab(tab), key)
            .unwrap_or_default()
    }

    /// Translation with `{name}` placeholders substituted from `args`.
    pub fn translation_with_args(&self, key: &str, tab: &str, args: &[(&str, &str)]) -> String {
        interpolate(self.translation(key, tab), args)
    }

    /// All translations of a tab under the active language.
    pub fn translations(&self, tab: &str) -> HashMap<String, String> {
        self.engine.entries(&Resource::tab(tab))
    }

    // === Colors & Images ===

    /// Hex color value for a key, if published.
    pub fn color_value(&self, key: &str) -> Option<String> {
        self.engine.entry(&Resource::Colors, key)
    }

    /// URL of a globally published image, if any.
    pub fn image_url(&self, key: &str) -> Option<String> {
        self.engine.entry(&Resource::Images, key)
    }

    // === Data Stores ===

    /// All records of a data store, ordered by record ID. Empty until
    /// the store has synced.
    pub fn records(&self, store: &str) -> Vec<StoreRecord> {
        self.engine.store_records(store)
    }

    /// One record of a data store.
    pub fn record(&self, store: &str, id: &str) -> Option<StoreRecord> {
        self.engine.store_record(store, id)
    }

    // === Language ===

    /// Switches the active language. Cached content re-resolves and is
    /// re-dispatched immediately; the returned future completes once
    /// the background resync of every known resource finished. `force`
    /// re-runs the cascade even when the language is unchanged.
    pub async fn set_language(&self, language: &str, force: bool) {
        self.engine.set_language(language, force).await;
    }

    /// The active language code.
    pub fn language(&self) -> String {
        self.engine.language()
    }

    /// Languages the project publishes. Empty before the first
    /// authenticated session.
    pub fn available_languages(&self) -> Vec<String> {
        self.engine.available_languages()
    }

    // === Synchronization ===

    /// Synchronizes one resource now. Returns `true` when fresh content
    /// was merged, `false` when the cycle failed or a sync for the same
    /// resource was already running.
    pub async fn sync(&self, resource: &Resource) -> bool {
        self.engine.sync(resource).await
    }

    /// Synchronizes every known resource and waits for completion.
    pub async fn sync_all(&self) {
        self.engine.sync_all().await;
    }

    /// Hints that the app returned to the foreground: schedules an
    /// immediate refresh of every known resource.
    pub fn on_foreground(&self) {
        self.engine.sync_detached();
    }

    /// Whether the realtime channel is currently established.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// When a resource last received an update in this process.
    pub fn last_update(&self, resource: &Resource) -> Option<SystemTime> {
        self.engine.last_update(resource)
    }

    // === Updates ===

    /// Registers a callback for updates of one resource. Callbacks run
    /// on the delivery task, not on the caller's thread.
    pub fn on_updated<F>(&self, resource: &Resource, callback: F) -> HandlerId
    where
        F: Fn(&ResourceUpdate) + Send + Sync + 'static,
    {
        self.add_update_handler(resource, Arc::new(CallbackHandler::new(callback)))
    }

    /// Registers an [`UpdateHandler`] for updates of one resource.
    pub fn add_update_handler(
        &self,
        resource: &Resource,
        handler: Arc<dyn UpdateHandler>,
    ) -> HandlerId {
        self.engine.add_handler(resource, handler)
    }

    /// Removes a previously registered handler. Returns `false` when
    /// the ID is unknown.
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        self.engine.remove_handler(id)
    }

    /// Subscribes to the payload-free change feed. Every delivered
    /// update also emits a [`ResourceChanged`] here.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ResourceChanged> {
        self.engine.subscribe_changes()
    }

    // === Lifecycle ===

    /// Drops all cached content and the on-disk cache files.
    /// Credentials are kept; content rebuilds on the next access.
    pub fn clear_cache(&self) {
        self.engine.clear();
    }

    /// Writes a final snapshot and stops the background tasks. Safe to
    /// call more than once; also runs on drop.
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Shutting down Lexio client");
        let _ = self.shutdown.send(true);
        self.engine.shutdown();
    }
}

impl Drop for Lexio {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Replaces `{name}` placeholders with their argument values.
fn interpolate(mut text: String, args: &[(&str, &str)]) -> String {
    for (name, value) in args {
        text = text.replace(&format!("{{{}}}", name), value);
    }
    text
}
