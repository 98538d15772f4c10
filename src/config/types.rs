//! Configuration types for the settings store

use std::path::{Path, PathBuf};

use crate::config::SetOptions;
use crate::error::{Error, Result};
use crate::storage::{JsonStorage, StorageBackend, WriteOptions};

/// File name used when none is configured
pub const DEFAULT_FILE_NAME: &str = "Settings";

/// Configuration for a [`SettingsStore`](crate::SettingsStore)
#[derive(Debug, Clone)]
pub struct StoreConfig<S: StorageBackend = JsonStorage> {
    /// Application name (used to derive the default location)
    pub app_name: String,

    /// Absolute path to the backing file
    pub file_path: PathBuf,

    /// Storage backend implementation
    pub storage: S,

    /// Pretty-print writes unless a call overrides it
    pub prettify: bool,

    /// Write through a temp file and rename
    pub atomic_save: bool,

    /// Unix only: owner-only permissions on the directory and file
    pub secure_permissions: bool,
}

impl<S: StorageBackend> StoreConfig<S> {
    /// Resolve per-call options against the store defaults
    #[must_use]
    pub fn write_options(&self, options: &SetOptions) -> WriteOptions {
        WriteOptions {
            pretty: options.prettify.unwrap_or(self.prettify),
            atomic: self.atomic_save,
            secure: self.secure_permissions,
        }
    }
}

impl StoreConfig<JsonStorage> {
    /// Create a new builder for `StoreConfig`
    ///
    /// # Example
    /// ```rust
    /// use dotsettings::StoreConfig;
    ///
    /// let config = StoreConfig::builder("my-app")
    ///     .config_dir("/tmp/my-app")
    ///     .build()?;
    /// assert!(config.file_path.ends_with("my-app/Settings"));
    /// # Ok::<(), dotsettings::Error>(())
    /// ```
    pub fn builder(app_name: impl Into<String>) -> StoreConfigBuilder {
        StoreConfigBuilder::new(app_name)
    }
}

/// Builder for creating a `StoreConfig` with a fluent API
#[derive(Debug, Clone)]
pub struct StoreConfigBuilder<S: StorageBackend = JsonStorage> {
    app_name: String,
    config_dir: Option<PathBuf>,
    file_name: String,
    file: Option<PathBuf>,
    storage: S,
    prettify: bool,
    atomic_save: bool,
    secure_permissions: bool,
}

impl StoreConfigBuilder<JsonStorage> {
    /// Create a new builder with the required app name
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            config_dir: None,
            file_name: DEFAULT_FILE_NAME.into(),
            file: None,
            storage: JsonStorage::new(),
            prettify: false,
            atomic_save: true,
            secure_permissions: false,
        }
    }
}

impl<S: StorageBackend> StoreConfigBuilder<S> {
    /// Set the directory holding the backing file
    ///
    /// Supports `~` expansion for home directory.
    #[must_use]
    pub fn config_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(expand_home(path.into()));
        self
    }

    /// Set the backing file name (default: "Settings")
    #[must_use]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Use an explicit backing file path, ignoring `config_dir` and `file_name`
    ///
    /// Supports `~` expansion for home directory.
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(expand_home(path.into()));
        self
    }

    /// Pretty-print JSON by default (default: compact)
    #[must_use]
    pub fn prettify(mut self, prettify: bool) -> Self {
        self.prettify = prettify;
        self
    }

    /// Write via temp file + rename (default: true)
    #[must_use]
    pub fn atomic_save(mut self, atomic: bool) -> Self {
        self.atomic_save = atomic;
        self
    }

    /// Restrict created directories to 0o700 and the file to 0o600 (Unix only)
    #[must_use]
    pub fn secure_permissions(mut self, secure: bool) -> Self {
        self.secure_permissions = secure;
        self
    }

    /// Swap the storage backend
    pub fn storage<T: StorageBackend>(self, storage: T) -> StoreConfigBuilder<T> {
        StoreConfigBuilder {
            app_name: self.app_name,
            config_dir: self.config_dir,
            file_name: self.file_name,
            file: self.file,
            storage,
            prettify: self.prettify,
            atomic_save: self.atomic_save,
            secure_permissions: self.secure_permissions,
        }
    }

    /// Build the `StoreConfig`
    ///
    /// If neither `file` nor `config_dir` is set, the file lives in the
    /// system config directory under the app name. The resulting path is
    /// always absolute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the app name or file name is empty, or the
    /// path cannot be made absolute.
    pub fn build(self) -> Result<StoreConfig<S>> {
        if self.file.is_none() {
            if self.file_name.trim().is_empty() {
                return Err(Error::Config("Settings file name must not be empty".into()));
            }
            if self.config_dir.is_none() && self.app_name.trim().is_empty() {
                return Err(Error::Config("App name must not be empty".into()));
            }
        }

        let file_path = match self.file {
            Some(file) => file,
            None => {
                let dir = self.config_dir.unwrap_or_else(|| {
                    // Use system config dir if available, otherwise current dir
                    dirs::config_dir()
                        .map(|d| d.join(&self.app_name))
                        .unwrap_or_else(|| PathBuf::from(".").join(&self.app_name))
                });
                dir.join(&self.file_name)
            }
        };

        let file_path = absolute(&file_path)?;

        Ok(StoreConfig {
            app_name: self.app_name,
            file_path,
            storage: self.storage,
            prettify: self.prettify,
            atomic_save: self.atomic_save,
            secure_permissions: self.secure_permissions,
        })
    }
}

fn expand_home(path: PathBuf) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(path.strip_prefix("~").unwrap_or(&path));
        }
    }
    path
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| {
        Error::Config(format!(
            "Cannot resolve absolute path for '{}': {e}",
            path.display()
        ))
    })
}
