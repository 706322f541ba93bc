// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Update dispatch
//!
//! All observer callbacks run on one dedicated delivery task, so
//! handlers never run concurrently with each other and never re-enter
//! engine state mid-mutation. A panicking handler is isolated and
//! logged; the remaining handlers still run.

use std::collections::{HashMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::cache::StoreRecord;
use crate::sync::Resource;

/// Identifier of a registered update handler.
pub type HandlerId = u64;

/// Values delivered with an update, resolved for the active language.
#[derive(Debug, Clone)]
pub enum UpdatePayload {
    /// Key/value entries of a tab, the color set or the image set.
    Entries(HashMap<String, String>),
    /// Records of a data store.
    Records(Vec<StoreRecord>),
}

/// A content update delivered to handlers.
#[derive(Debug, Clone)]
pub struct ResourceUpdate {
    /// The resource that changed.
    pub resource: Resource,
    /// Its current values.
    pub payload: UpdatePayload,
}

/// Payload-free change signal for reactive bindings.
///
/// Carries only the resource slug; subscribers re-read the cache.
#[derive(Debug, Clone)]
pub struct ResourceChanged {
    /// Slug of the resource that changed.
    pub slug: String,
}

/// Update handler trait.
///
/// Implement this trait to receive content updates.
pub trait UpdateHandler: Send + Sync {
    /// Called on the delivery task when a resource was updated.
    fn on_update(&self, update: &ResourceUpdate);
}

/// Simple callback-based update handler.
///
/// Wraps a closure for easy update handling.
pub struct CallbackHandler<F>
where
    F: Fn(&ResourceUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(&ResourceUpdate) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> UpdateHandler for CallbackHandler<F>
where
    F: Fn(&ResourceUpdate) + Send + Sync,
{
    fn on_update(&self, update: &ResourceUpdate) {
        (self.callback)(update);
    }
}

#[derive(Default)]
struct DispatcherState {
    /// The engine's own observer, set once at startup.
    internal: Option<Arc<dyn UpdateHandler>>,
    /// Slugs the internal observer is registered for.
    internal_slugs: HashSet<String>,
    /// Application handlers per resource slug.
    handlers: HashMap<String, Vec<(HandlerId, Arc<dyn UpdateHandler>)>>,
    next_id: HandlerId,
}

/// Dispatcher owning the delivery task.
pub struct UpdateDispatcher {
    tx: mpsc::UnboundedSender<ResourceUpdate>,
    state: Arc<Mutex<DispatcherState>>,
    changes: broadcast::Sender<ResourceChanged>,
    task: JoinHandle<()>,
}

impl UpdateDispatcher {
    /// Spawns the delivery task. Must be called inside a tokio runtime.
    pub(crate) fn spawn(changes: broadcast::Sender<ResourceChanged>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<ResourceUpdate>();
        let state = Arc::new(Mutex::new(DispatcherState::default()));

        let task_state = state.clone();
        let task_changes = changes.clone();
        let task = tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                deliver(&task_state, &task_changes, update);
            }
        });

        Self {
            tx,
            state,
            changes,
            task,
        }
    }

    /// Sets the engine's internal observer. Called once at startup.
    pub(crate) fn set_internal(&self, handler: Arc<dyn UpdateHandler>) {
        self.lock().internal = Some(handler);
    }

    /// Registers the internal observer for a slug. Idempotent; never
    /// displaces application handlers.
    pub(crate) fn register_internal(&self, slug: &str) {
        self.lock().internal_slugs.insert(slug.to_string());
    }

    /// Enqueues an update for delivery.
    pub(crate) fn notify(&self, update: ResourceUpdate) {
        // The receiver lives as long as the delivery task; a send error
        // only happens during shutdown.
        let _ = self.tx.send(update);
    }

    /// Adds an application handler for a resource.
    pub fn add_handler(&self, resource: &Resource, handler: Arc<dyn UpdateHandler>) -> HandlerId {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        state
            .handlers
            .entry(resource.slug())
            .or_default()
            .push((id, handler));
        id
    }

    /// Removes a handler by ID. Returns true if it was registered.
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        let mut state = self.lock();
        for handlers in state.handlers.values_mut() {
            let before = handlers.len();
            handlers.retain(|(handler_id, _)| *handler_id != id);
            if handlers.len() != before {
                return true;
            }
        }
        false
    }

    /// Returns the number of registered application handlers.
    pub fn handler_count(&self) -> usize {
        self.lock().handlers.values().map(Vec::len).sum()
    }

    /// Subscribes to the payload-free change signal.
    pub fn subscribe(&self) -> broadcast::Receiver<ResourceChanged> {
        self.changes.subscribe()
    }

    /// Stops the delivery task. Queued updates are dropped.
    pub(crate) fn shutdown(&self) {
        self.task.abort();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DispatcherState> {
        self.state.lock().expect("dispatcher mutex poisoned")
    }
}

/// Delivers one update: internal observer first, then application
/// handlers, then the broadcast signal.
fn deliver(
    state: &Arc<Mutex<DispatcherState>>,
    changes: &broadcast::Sender<ResourceChanged>,
    update: ResourceUpdate,
) {
    let slug = update.resource.slug();
    let (internal, handlers) = {
        let state = state.lock().expect("dispatcher mutex poisoned");
        let internal = state
            .internal_slugs
            .contains(&slug)
            .then(|| state.internal.clone())
            .flatten();
        let handlers: Vec<Arc<dyn UpdateHandler>> = state
            .handlers
            .get(&slug)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();
        (internal, handlers)
    };

    if let Some(handler) = internal {
        handler.on_update(&update);
    }
    for handler in handlers {
        if catch_unwind(AssertUnwindSafe(|| handler.on_update(&update))).is_err() {
            warn!("Update handler panicked for {}", slug);
        }
    }
    // No receivers is fine; the signal is fire-and-forget.
    let _ = changes.send(ResourceChanged { slug });
}
