// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync engine
//!
//! Coordinates every mutation of the content cache. All shared state
//! lives behind one mutex; the lock is never held across an await, so
//! reads stay non-blocking while network cycles run on spawned tasks.
//! Per-resource sync cycles are serialized by the in-flight set: a
//! second sync for a resource already being fetched is rejected, not
//! queued.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::api::{
    LexioConfig, ResourceChanged, ResourceUpdate, UpdateDispatcher, UpdateHandler, UpdatePayload,
};
use crate::cache::{
    CacheError, CacheSnapshot, ContentStore, Credentials, Persistence, StoreRecord, NEUTRAL_LANG,
};
use crate::remote::{Gateway, GatewayError, RequestSigner, ResourcePayload, Session};

use super::resource::{Resource, COLORS_ID, IMAGES_ID};

/// Errors inside a sync cycle. Never surfaced to the application;
/// cycles report failure as a `false` return and a log line.
#[derive(Debug, Error)]
pub(crate) enum SyncError {
    #[error("API credentials are not configured")]
    NotConfigured,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Jobs for the persistence writer task.
pub(crate) enum PersistJob {
    /// Write the current snapshot and registry.
    Flush,
    /// Delete the snapshot and registry files.
    Clear,
}

/// Everything the engine guards with its coordinating lock.
struct CoreState {
    cache: ContentStore,
    known: BTreeSet<String>,
    observed: HashSet<String>,
    in_flight: HashSet<String>,
    language: String,
    credentials: Option<Credentials>,
    session: Option<Session>,
    last_updated: HashMap<String, SystemTime>,
}

impl CoreState {
    /// Resources a full refresh covers: the known registry, everything
    /// cached, and the reserved color and image sets.
    fn refresh_targets(&self) -> Vec<Resource> {
        let mut slugs = self.known.clone();
        slugs.extend(self.cache.entry_slugs());
        slugs.extend(
            self.cache
                .record_stores()
                .into_iter()
                .map(|id| Resource::store(id).slug()),
        );
        slugs.insert(COLORS_ID.to_string());
        slugs.insert(IMAGES_ID.to_string());
        slugs.iter().filter_map(|s| Resource::from_slug(s)).collect()
    }
}

struct EngineInner {
    config: LexioConfig,
    state: Arc<Mutex<CoreState>>,
    gateway: Gateway,
    signer: Arc<dyn RequestSigner>,
    dispatcher: UpdateDispatcher,
    persistence: Persistence,
    persist_tx: mpsc::UnboundedSender<PersistJob>,
    auth_gate: tokio::sync::Mutex<()>,
    runtime: Handle,
    writer: JoinHandle<()>,
}

/// Handle to the sync engine. Cheap to clone; all clones share state.
#[derive(Clone)]
pub(crate) struct SyncEngine {
    inner: Arc<EngineInner>,
}

impl SyncEngine {
    /// Builds the engine, loads persisted state and spawns the writer
    /// and dispatcher tasks. Infallible: corrupt or missing files load
    /// as empty state.
    pub(crate) fn start(
        config: LexioConfig,
        gateway: Gateway,
        persistence: Persistence,
        signer: Arc<dyn RequestSigner>,
        changes: broadcast::Sender<ResourceChanged>,
        runtime: Handle,
    ) -> SyncEngine {
        let mut state = CoreState {
            cache: ContentStore::new(),
            known: persistence.load_registry(),
            observed: HashSet::new(),
            in_flight: HashSet::new(),
            language: config.default_language.clone(),
            credentials: persistence.load_credentials(),
            session: None,
            last_updated: HashMap::new(),
        };
        if let Some(snapshot) = persistence.load_snapshot() {
            state.language = snapshot.language;
            state.cache = snapshot.content;
        }
        info!(
            "Cache loaded: {} known resources, language {}",
            state.known.len(),
            state.language
        );
        let state = Arc::new(Mutex::new(state));

        let dispatcher = UpdateDispatcher::spawn(changes);
        dispatcher.set_internal(Arc::new(InternalObserver {
            state: state.clone(),
        }));

        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        let writer = runtime.spawn(run_writer(
            persist_rx,
            state.clone(),
            persistence.clone(),
            config.save_debounce,
        ));

        SyncEngine {
            inner: Arc::new(EngineInner {
                config,
                state,
                gateway,
                signer,
                dispatcher,
                persistence,
                persist_tx,
                auth_gate: tokio::sync::Mutex::new(()),
                runtime,
                writer,
            }),
        }
    }

    // === Configuration ===

    /// Stores API credentials, persists them and kicks off a catch-up
    /// sync. Any previous session is dropped.
    pub(crate) fn configure(&self, credentials: Credentials) -> Result<(), CacheError> {
        {
            let mut st = self.lock_state();
            st.session = None;
            st.credentials = Some(credentials.clone());
        }
        self.inner.persistence.save_credentials(&credentials)?;
        info!("API credentials configured");
        self.sync_detached();
        Ok(())
    }

    pub(crate) fn config(&self) -> &LexioConfig {
        &self.inner.config
    }

    // === Reads ===

    /// Looks up one entry under the active language. Observation side
    /// effect: first access to a resource bootstraps its subscription.
    pub(crate) fn entry(&self, resource: &Resource, key: &str) -> Option<String> {
        self.ensure_observed(resource);
        let st = self.lock_state();
        let language = if resource.is_localized() {
            st.language.as_str()
        } else {
            NEUTRAL_LANG
        };
        st.cache.get(&resource.slug(), key, language).map(str::to_string)
    }

    /// All entries of a resource under the active language.
    pub(crate) fn entries(&self, resource: &Resource) -> HashMap<String, String> {
        self.ensure_observed(resource);
        let st = self.lock_state();
        let language = if resource.is_localized() {
            st.language.as_str()
        } else {
            NEUTRAL_LANG
        };
        st.cache.get_all(&resource.slug(), language)
    }

    /// All records of a data store, ordered by record ID.
    pub(crate) fn store_records(&self, store: &str) -> Vec<StoreRecord> {
        self.ensure_observed(&Resource::store(store));
        self.lock_state().cache.records(store)
    }

    /// One record of a data store.
    pub(crate) fn store_record(&self, store: &str, id: &str) -> Option<StoreRecord> {
        self.ensure_observed(&Resource::store(store));
        self.lock_state().cache.record(store, id).cloned()
    }

    pub(crate) fn language(&self) -> String {
        self.lock_state().language.clone()
    }

    /// Languages reported by the backend; empty before the first session.
    pub(crate) fn available_languages(&self) -> Vec<String> {
        self.lock_state()
            .session
            .as_ref()
            .map(|s| s.languages.clone())
            .unwrap_or_default()
    }

    /// When the resource last had an update delivered, if ever.
    pub(crate) fn last_update(&self, resource: &Resource) -> Option<SystemTime> {
        self.lock_state().last_updated.get(&resource.slug()).copied()
    }

    // === Subscription tracking ===

    /// Ensures a resource is observed: registers the internal observer
    /// with the dispatcher and, when nothing is cached yet, spawns one
    /// background sync. At most one bootstrap sync per resource per
    /// process lifetime.
    pub(crate) fn ensure_observed(&self, resource: &Resource) {
        let slug = resource.slug();
        let needs_sync = {
            let mut st = self.lock_state();
            if st.observed.contains(&slug) {
                return;
            }
            st.observed.insert(slug.clone());
            match resource {
                Resource::Store(id) => !st.cache.has_records(id),
                _ => !st.cache.contains_entries(&slug),
            }
        };
        self.inner.dispatcher.register_internal(&slug);
        debug!("Observing {}", slug);
        if needs_sync {
            self.spawn_sync(resource.clone());
        }
    }

    // === Synchronization ===

    /// Synchronizes one resource. Returns true when the cycle fetched
    /// and merged new content, false when it failed or was rejected
    /// because a sync for the same resource is already in flight.
    pub(crate) async fn sync(&self, resource: &Resource) -> bool {
        let slug = resource.slug();
        let _guard = {
            let mut st = self.lock_state();
            if !st.in_flight.insert(slug.clone()) {
                debug!("Sync already in flight for {}; skipping", slug);
                return false;
            }
            FlightGuard {
                state: self.inner.state.clone(),
                slug: slug.clone(),
            }
        };

        match self.run_cycle(resource).await {
            Ok(()) => {
                debug!("Synced {}", slug);
                true
            }
            Err(SyncError::NotConfigured) => {
                debug!("Skipping sync for {}: no credentials configured", slug);
                false
            }
            Err(e) => {
                warn!("Sync failed for {}; keeping cached content: {}", slug, e);
                false
            }
        }
    }

    /// Spawns a detached sync for one resource.
    pub(crate) fn spawn_sync(&self, resource: Resource) {
        let engine = self.clone();
        self.inner.runtime.spawn(async move {
            engine.sync(&resource).await;
        });
    }

    /// Spawns detached syncs for every refresh target. Used by the poll
    /// scheduler, foreground triggers and channel catch-ups.
    pub(crate) fn sync_detached(&self) {
        let targets = self.lock_state().refresh_targets();
        debug!("Scheduling refresh for {} resources", targets.len());
        for resource in targets {
            self.spawn_sync(resource);
        }
    }

    /// Synchronizes every refresh target and waits for completion.
    pub(crate) async fn sync_all(&self) {
        let targets = self.lock_state().refresh_targets();
        let mut syncs = JoinSet::new();
        for resource in targets {
            let engine = self.clone();
            syncs.spawn(async move {
                engine.sync(&resource).await;
            });
        }
        while syncs.join_next().await.is_some() {}
    }

    /// Switches the active language.
    ///
    /// Cached values are dispatched immediately under the new language,
    /// then every known resource is resynchronized. Resolves once all
    /// resyncs finished.
    pub(crate) async fn set_language(&self, language: &str, force: bool) {
        let resources = {
            let mut st = self.lock_state();
            if st.language == language && !force {
                return;
            }
            st.language = language.to_string();
            st.refresh_targets()
        };
        info!("Switching language to {}", language);
        let _ = self.inner.persist_tx.send(PersistJob::Flush);

        let mut syncs = JoinSet::new();
        for resource in resources {
            // Serve what we have immediately; the resync follows.
            self.dispatch_cached(&resource);
            let engine = self.clone();
            syncs.spawn(async move {
                engine.sync(&resource).await;
            });
        }
        while syncs.join_next().await.is_some() {}
        debug!("Language switch to {} complete", language);
    }

    /// Classifies a remote ID from a push frame.
    pub(crate) fn resolve_remote_id(&self, id: &str) -> Resource {
        if id == COLORS_ID {
            return Resource::Colors;
        }
        if id == IMAGES_ID {
            return Resource::Images;
        }
        let st = self.lock_state();
        let is_store = st
            .session
            .as_ref()
            .is_some_and(|s| s.store_ids.contains(id))
            || st.known.contains(&Resource::store(id).slug());
        if is_store {
            Resource::store(id)
        } else {
            Resource::tab(id)
        }
    }

    /// Token for the realtime handshake, authenticating first if needed.
    pub(crate) async fn handshake_token(&self) -> Result<String, SyncError> {
        let session = self.ensure_session().await?;
        Ok(self.inner.signer.channel_token(&session.token))
    }

    // === Events ===

    pub(crate) fn add_handler(
        &self,
        resource: &Resource,
        handler: Arc<dyn UpdateHandler>,
    ) -> crate::api::HandlerId {
        self.inner.dispatcher.add_handler(resource, handler)
    }

    pub(crate) fn remove_handler(&self, id: crate::api::HandlerId) -> bool {
        self.inner.dispatcher.remove_handler(id)
    }

    pub(crate) fn subscribe_changes(&self) -> broadcast::Receiver<ResourceChanged> {
        self.inner.dispatcher.subscribe()
    }

    // === Lifecycle ===

    /// Drops all cached content, observation state and durable files.
    /// Credentials survive; the next access starts from scratch.
    pub(crate) fn clear(&self) {
        {
            let mut st = self.lock_state();
            st.cache.clear();
            st.known.clear();
            st.observed.clear();
            st.in_flight.clear();
            st.last_updated.clear();
        }
        let _ = self.inner.persist_tx.send(PersistJob::Clear);
        info!("Cache cleared");
    }

    /// Writes a final snapshot and stops the background tasks.
    pub(crate) fn shutdown(&self) {
        let (snapshot, registry) = {
            let st = self.lock_state();
            (
                CacheSnapshot {
                    language: st.language.clone(),
                    content: st.cache.clone(),
                },
                st.known.clone(),
            )
        };
        if let Err(e) = self.inner.persistence.save_snapshot(&snapshot) {
            warn!("Final snapshot save failed: {}", e);
        }
        if let Err(e) = self.inner.persistence.save_registry(&registry) {
            warn!("Final registry save failed: {}", e);
        }
        self.inner.writer.abort();
        self.inner.dispatcher.shutdown();
    }

    // === Internals ===

    async fn run_cycle(&self, resource: &Resource) -> Result<(), SyncError> {
        let session = self.ensure_session().await?;
        match self.inner.gateway.fetch(&session.token, resource).await {
            Ok(payload) => {
                self.apply_update(resource, payload);
                Ok(())
            }
            Err(GatewayError::Unauthorized) => {
                // Session expired. Drop it so the next sync re-authenticates.
                self.lock_state().session = None;
                Err(GatewayError::Unauthorized.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the current session, authenticating if there is none.
    /// The gate serializes concurrent first-syncs into one auth request.
    async fn ensure_session(&self) -> Result<Session, SyncError> {
        if let Some(session) = self.lock_state().session.clone() {
            return Ok(session);
        }
        let _gate = self.inner.auth_gate.lock().await;
        if let Some(session) = self.lock_state().session.clone() {
            return Ok(session);
        }
        let credentials = self
            .lock_state()
            .credentials
            .clone()
            .ok_or(SyncError::NotConfigured)?;
        let session = self.inner.gateway.authenticate(&credentials).await?;
        {
            let mut st = self.lock_state();
            // The project listing seeds the registry so polls and
            // catch-ups cover resources nobody accessed yet.
            for tab in &session.tabs {
                st.known.insert(Resource::tab(tab.clone()).slug());
            }
            for store in &session.store_ids {
                st.known.insert(Resource::store(store.clone()).slug());
            }
            st.session = Some(session.clone());
        }
        let _ = self.inner.persist_tx.send(PersistJob::Flush);
        info!(
            "Session opened; {} languages available",
            session.languages.len()
        );
        Ok(session)
    }

    /// Merges a fetched payload and fans out the update. The lock is
    /// released before persistence and dispatch.
    fn apply_update(&self, resource: &Resource, payload: ResourcePayload) {
        let slug = resource.slug();
        let update = {
            let mut st = self.lock_state();
            let payload = match payload {
                ResourcePayload::Entries(entries) => {
                    st.cache.merge_entries(&slug, entries);
                    let language = if resource.is_localized() {
                        st.language.clone()
                    } else {
                        NEUTRAL_LANG.to_string()
                    };
                    UpdatePayload::Entries(st.cache.get_all(&slug, &language))
                }
                ResourcePayload::Records(records) => {
                    let store = resource.remote_id();
                    st.cache.merge_records(store, records);
                    UpdatePayload::Records(st.cache.records(store))
                }
            };
            st.known.insert(slug);
            ResourceUpdate {
                resource: resource.clone(),
                payload,
            }
        };
        let _ = self.inner.persist_tx.send(PersistJob::Flush);
        self.inner.dispatcher.notify(update);
    }

    /// Dispatches the cached values of a resource, if any.
    fn dispatch_cached(&self, resource: &Resource) {
        let update = {
            let st = self.lock_state();
            let slug = resource.slug();
            match resource {
                Resource::Store(id) => {
                    if !st.cache.has_records(id) {
                        return;
                    }
                    ResourceUpdate {
                        resource: resource.clone(),
                        payload: UpdatePayload::Records(st.cache.records(id)),
                    }
                }
                _ => {
                    if !st.cache.contains_entries(&slug) {
                        return;
                    }
                    let language = if resource.is_localized() {
                        st.language.as_str()
                    } else {
                        NEUTRAL_LANG
                    };
                    ResourceUpdate {
                        resource: resource.clone(),
                        payload: UpdatePayload::Entries(st.cache.get_all(&slug, language)),
                    }
                }
            }
        };
        self.inner.dispatcher.notify(update);
    }

    fn lock_state(&self) -> MutexGuard<'_, CoreState> {
        self.inner.state.lock().expect("state mutex poisoned")
    }
}

/// Removes a slug from the in-flight set when a cycle ends, whether it
/// succeeded, failed or was cancelled with its task.
struct FlightGuard {
    state: Arc<Mutex<CoreState>>,
    slug: String,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        // A poisoned lock means the process is tearing down anyway.
        if let Ok(mut st) = self.state.lock() {
            st.in_flight.remove(&self.slug);
        }
    }
}

/// The engine's own observer: records delivery timestamps per resource.
struct InternalObserver {
    state: Arc<Mutex<CoreState>>,
}

impl UpdateHandler for InternalObserver {
    fn on_update(&self, update: &ResourceUpdate) {
        let mut st = self.state.lock().expect("state mutex poisoned");
        st.last_updated
            .insert(update.resource.slug(), SystemTime::now());
    }
}

/// Writer task: coalesces flush requests and keeps file writes off the
/// sync path. A clear request wins over pending flushes.
async fn run_writer(
    mut rx: mpsc::UnboundedReceiver<PersistJob>,
    state: Arc<Mutex<CoreState>>,
    persistence: Persistence,
    debounce: Duration,
) {
    while let Some(mut job) = rx.recv().await {
        if matches!(job, PersistJob::Flush) {
            tokio::time::sleep(debounce).await;
            while let Ok(next) = rx.try_recv() {
                if matches!(next, PersistJob::Clear) {
                    job = PersistJob::Clear;
                    break;
                }
            }
        }
        match job {
            PersistJob::Clear => {
                if let Err(e) = persistence.clear() {
                    warn!("Failed to remove cache files: {}", e);
                }
            }
            PersistJob::Flush => {
                let (snapshot, registry) = {
                    let st = state.lock().expect("state mutex poisoned");
                    (
                        CacheSnapshot {
                            language: st.language.clone(),
                            content: st.cache.clone(),
                        },
                        st.known.clone(),
                    )
                };
                if let Err(e) = persistence.save_snapshot(&snapshot) {
                    warn!("Failed to save cache snapshot: {}", e);
                }
                if let Err(e) = persistence.save_registry(&registry) {
                    warn!("Failed to save resource registry: {}", e);
                }
            }
        }
    }
}
