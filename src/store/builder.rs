//! Builder for SettingsStore
//!
//! This module contains [`SettingsStoreBuilder`] which provides a fluent API
//! for creating a [`SettingsStore`](super::SettingsStore).

use crate::config::StoreConfigBuilder;
use crate::error::Result;
use crate::storage::{JsonStorage, StorageBackend};
use std::path::PathBuf;

use super::SettingsStore;

/// Builder for creating a [`SettingsStore`] with a fluent API.
///
/// # Example
///
/// ```rust,no_run
/// use dotsettings::SettingsStore;
///
/// let store = SettingsStore::builder("my-app")
///     .config_dir("~/.config/my-app")
///     .prettify(true)
///     .secure_permissions(true)
///     .build()
///     .unwrap();
/// ```
pub struct SettingsStoreBuilder<S: StorageBackend = JsonStorage> {
    config_builder: StoreConfigBuilder<S>,
}

impl SettingsStoreBuilder<JsonStorage> {
    /// Create a new builder with the required app name.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            config_builder: StoreConfigBuilder::new(app_name),
        }
    }
}

impl<S: StorageBackend> SettingsStoreBuilder<S> {
    /// Set the directory holding the backing file.
    ///
    /// Supports `~` expansion for home directory.
    #[must_use]
    pub fn config_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_builder = self.config_builder.config_dir(path);
        self
    }

    /// Set the backing file name (default: "Settings").
    #[must_use]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.file_name(name);
        self
    }

    /// Use an explicit backing file path.
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_builder = self.config_builder.file(path);
        self
    }

    /// Pretty-print JSON unless a call says otherwise.
    #[must_use]
    pub fn prettify(mut self, prettify: bool) -> Self {
        self.config_builder = self.config_builder.prettify(prettify);
        self
    }

    /// Write via temp file + rename (default: true).
    #[must_use]
    pub fn atomic_save(mut self, atomic: bool) -> Self {
        self.config_builder = self.config_builder.atomic_save(atomic);
        self
    }

    /// Owner-only permissions on the directory and file (Unix only).
    #[must_use]
    pub fn secure_permissions(mut self, secure: bool) -> Self {
        self.config_builder = self.config_builder.secure_permissions(secure);
        self
    }

    /// Use a different storage backend.
    pub fn storage<T: StorageBackend>(self, storage: T) -> SettingsStoreBuilder<T> {
        SettingsStoreBuilder {
            config_builder: self.config_builder.storage(storage),
        }
    }

    /// Build the [`SettingsStore`].
    ///
    /// Resolves the backing file location; nothing is read or written yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file path cannot be resolved.
    pub fn build(self) -> Result<SettingsStore<S>> {
        let config = self.config_builder.build()?;
        Ok(SettingsStore::new(config))
    }
}
