//! Settings store module
//!
//! This module contains the [`SettingsStore`] struct, the primary entry point
//! for reading, writing and watching settings.

mod builder;
mod cache;
mod io;
mod operations;

pub use builder::SettingsStoreBuilder;

use crate::config::StoreConfig;
use crate::events::ObserverRegistry;
use crate::storage::{JsonStorage, StorageBackend};
use cache::DocumentCache;

use log::info;
use std::path::Path;
use std::sync::Arc;

/// Key-path addressable settings backed by a JSON file.
///
/// The document is loaded from the backing file on first access and every
/// mutation is written straight back (write-through). Observers registered
/// with [`watch`](SettingsStore::watch) are notified after each mutation that
/// changes the value at their key path.
///
/// There is no global instance: construct one store per backing file and
/// share it (for example behind an `Arc`) where needed.
///
/// # Example
///
/// ```rust,no_run
/// use dotsettings::SettingsStore;
/// use serde_json::json;
///
/// let store = SettingsStore::builder("my-app")
///     .config_dir("~/.config/my-app")
///     .prettify(true)
///     .build()?;
///
/// store
///     .set("window.width", 1280)?
///     .set("window.height", 720)?;
///
/// assert_eq!(store.get("window.width", None)?, Some(json!(1280)));
/// println!("settings live in {}", store.file().display());
/// # Ok::<(), dotsettings::Error>(())
/// ```
pub struct SettingsStore<S: StorageBackend = JsonStorage> {
    /// Configuration (backing file location, write defaults, storage backend)
    config: StoreConfig<S>,

    /// Lazily loaded document
    cache: DocumentCache,

    /// Registered observers
    observers: Arc<ObserverRegistry>,
}

impl<S: StorageBackend> std::fmt::Debug for SettingsStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore").finish_non_exhaustive()
    }
}

impl SettingsStore {
    /// Create a builder for `SettingsStore` with a fluent API.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use dotsettings::SettingsStore;
    ///
    /// let store = SettingsStore::builder("my-app")
    ///     .file_name("preferences.json")
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn builder(app_name: impl Into<String>) -> SettingsStoreBuilder {
        SettingsStoreBuilder::new(app_name)
    }
}

impl<S: StorageBackend> SettingsStore<S> {
    /// Create a store from a configuration.
    ///
    /// Nothing is read or written until the first operation.
    pub fn new(config: StoreConfig<S>) -> Self {
        info!(
            "Initialized settings store at: {}",
            config.file_path.display()
        );

        Self {
            config,
            cache: DocumentCache::new(),
            observers: Arc::new(ObserverRegistry::new()),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &StoreConfig<S> {
        &self.config
    }

    /// Absolute path to the backing file.
    ///
    /// The file does not need to exist yet; it is created on the first write.
    pub fn file(&self) -> &Path {
        &self.config.file_path
    }

    /// Whether the document has been loaded from disk yet
    pub fn is_loaded(&self) -> bool {
        self.cache.is_loaded()
    }

    /// Number of active observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Dispose every observer registered on this store
    pub fn unwatch_all(&self) {
        self.observers.clear();
        log::debug!("All observers disposed");
    }
}
