//! Observer registry for key-path change notifications
//!
//! Each observer remembers the last value it saw at its key path. After a
//! mutation the store hands the new document to [`ObserverRegistry::dispatch`],
//! which re-resolves every candidate path and calls the handlers whose value
//! actually changed. Changes made through an ancestor or a descendant path are
//! therefore picked up without any special casing.
//!
//! Dispatches are serialized through a queue with a single drainer. Each pass
//! resolves against the document as it is when the pass starts, so a handler
//! never sees an older document after a newer one, even when handlers mutate
//! the store or several threads write at once.

use crate::key_path::KeyPath;
use crate::sync::{MutexExt, RwLockExt};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

/// Type alias for a change handler
pub type ChangeHandler = Box<dyn Fn(&ChangeEvent<'_>) + Send + Sync>;

/// A change observed at a watched key path
pub struct ChangeEvent<'a> {
    key_path: &'a KeyPath,
    new_value: Option<&'a Value>,
    old_value: Option<&'a Value>,
    observer: &'a Observer,
}

impl<'a> ChangeEvent<'a> {
    /// The watched key path
    pub fn key_path(&self) -> &'a KeyPath {
        self.key_path
    }

    /// Value now at the key path, `None` if it no longer exists
    pub fn new_value(&self) -> Option<&'a Value> {
        self.new_value
    }

    /// Value previously at the key path, `None` if it did not exist
    pub fn old_value(&self) -> Option<&'a Value> {
        self.old_value
    }

    /// The observer this event was delivered to
    ///
    /// Handlers can call `event.observer().dispose()` to stop watching.
    pub fn observer(&self) -> &'a Observer {
        self.observer
    }
}

impl fmt::Debug for ChangeEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeEvent")
            .field("key_path", &self.key_path.to_string())
            .field("new_value", &self.new_value)
            .field("old_value", &self.old_value)
            .finish()
    }
}

struct ObserverEntry {
    id: u64,
    key_path: KeyPath,
    last_value: Mutex<Option<Value>>,
    active: AtomicBool,
    handler: ChangeHandler,
}

/// Handle to a registered watch
///
/// Dropping the handle does not stop the watch; call [`Observer::dispose`].
#[derive(Clone)]
pub struct Observer {
    entry: Arc<ObserverEntry>,
    registry: Weak<ObserverRegistry>,
}

impl Observer {
    /// The key path this observer watches
    pub fn key_path(&self) -> &KeyPath {
        &self.entry.key_path
    }

    /// Whether the observer will still receive changes
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.entry.active.load(Ordering::SeqCst)
    }

    /// Stop receiving changes. Calling this more than once is a no-op.
    pub fn dispose(&self) {
        if !self.entry.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.entry);
        }
        log::debug!("Disposed observer for '{}'", self.entry.key_path);
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("id", &self.entry.id)
            .field("key_path", &self.entry.key_path.to_string())
            .field("active", &self.is_active())
            .finish()
    }
}

/// Which observers a dispatch should consider
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DispatchScope {
    /// Observers whose path overlaps any of the changed paths
    Paths(Vec<KeyPath>),
    /// Every observer (wholesale replacement)
    All,
}

impl DispatchScope {
    /// Scope covering a single changed path
    pub(crate) fn path(changed: &KeyPath) -> Self {
        DispatchScope::Paths(vec![changed.clone()])
    }

    fn includes(&self, watched: &KeyPath) -> bool {
        match self {
            DispatchScope::Paths(changed) => changed.iter().any(|p| p.overlaps(watched)),
            DispatchScope::All => true,
        }
    }

    /// Widen this scope to also cover `other`
    fn merge(&mut self, other: DispatchScope) {
        match other {
            DispatchScope::All => *self = DispatchScope::All,
            DispatchScope::Paths(more) => {
                if let DispatchScope::Paths(paths) = self {
                    for path in more {
                        if !paths.contains(&path) {
                            paths.push(path);
                        }
                    }
                }
            }
        }
    }
}

/// Dispatch requests waiting for the active drain
#[derive(Default)]
struct DispatchQueue {
    draining: bool,
    pending: Option<DispatchScope>,
}

/// Registry of active observers, grouped by key path in registration order
pub(crate) struct ObserverRegistry {
    next_id: AtomicU64,
    observers: RwLock<BTreeMap<KeyPath, Vec<Arc<ObserverEntry>>>>,
    queue: Mutex<DispatchQueue>,
}

impl ObserverRegistry {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            observers: RwLock::new(BTreeMap::new()),
            queue: Mutex::new(DispatchQueue::default()),
        }
    }

    /// Register a handler, seeding its last-seen value with `current`
    pub(crate) fn register(
        self: &Arc<Self>,
        key_path: KeyPath,
        current: Option<Value>,
        handler: ChangeHandler,
    ) -> Observer {
        let entry = Arc::new(ObserverEntry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            key_path: key_path.clone(),
            last_value: Mutex::new(current),
            active: AtomicBool::new(true),
            handler,
        });

        self.observers
            .write_recovered()
            .entry(key_path)
            .or_default()
            .push(Arc::clone(&entry));

        Observer {
            entry,
            registry: Arc::downgrade(self),
        }
    }

    fn remove(&self, entry: &ObserverEntry) {
        let mut observers = self.observers.write_recovered();
        if let Some(entries) = observers.get_mut(&entry.key_path) {
            entries.retain(|e| e.id != entry.id);
            if entries.is_empty() {
                observers.remove(&entry.key_path);
            }
        }
    }

    /// Number of active observers
    pub(crate) fn len(&self) -> usize {
        self.observers.read_recovered().values().map(Vec::len).sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.observers.read_recovered().is_empty()
    }

    /// Deactivate and drop every observer
    pub(crate) fn clear(&self) {
        let drained = std::mem::take(&mut *self.observers.write_recovered());
        for entry in drained.into_values().flatten() {
            entry.active.store(false, Ordering::SeqCst);
        }
    }

    /// Queue `scope` for dispatch.
    ///
    /// Returns `true` if the caller must drain the queue with
    /// [`next_pending`](Self::next_pending). While a drain is running, on this
    /// thread (a re-entrant handler) or another, requests are merged into the
    /// pending scope and picked up by that drain instead.
    pub(crate) fn enqueue(&self, scope: DispatchScope) -> bool {
        let mut queue = self.queue.lock_recovered();
        match queue.pending.as_mut() {
            Some(pending) => pending.merge(scope),
            None => queue.pending = Some(scope),
        }
        !std::mem::replace(&mut queue.draining, true)
    }

    /// Take the next scope to dispatch, ending the drain once none is left
    pub(crate) fn next_pending(&self) -> Option<DispatchScope> {
        let mut queue = self.queue.lock_recovered();
        let next = queue.pending.take();
        if next.is_none() {
            queue.draining = false;
        }
        next
    }

    /// Notify observers whose resolved value differs in `document`.
    ///
    /// Handlers run without any registry lock held, so they may watch, dispose
    /// or mutate the store. A panicking handler is logged and skipped.
    pub(crate) fn dispatch(self: &Arc<Self>, document: &Value, scope: &DispatchScope) {
        let targets: Vec<Arc<ObserverEntry>> = {
            let observers = self.observers.read_recovered();
            observers
                .iter()
                .filter(|(path, _)| scope.includes(path))
                .flat_map(|(_, entries)| entries.iter().cloned())
                .collect()
        };

        for entry in targets {
            if !entry.active.load(Ordering::SeqCst) {
                continue;
            }

            let new_value = entry.key_path.resolve(document);
            let old_value = {
                let mut last = entry.last_value.lock_recovered();
                if last.as_ref() == new_value {
                    continue;
                }
                std::mem::replace(&mut *last, new_value.cloned())
            };

            let observer = Observer {
                entry: Arc::clone(&entry),
                registry: Arc::downgrade(self),
            };
            let event = ChangeEvent {
                key_path: &entry.key_path,
                new_value,
                old_value: old_value.as_ref(),
                observer: &observer,
            };

            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| (entry.handler)(&event))) {
                log::error!(
                    "Observer for '{}' panicked: {}",
                    entry.key_path,
                    panic_message(panic.as_ref())
                );
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

// =============================================================================
// Tests
// =============================================================================
