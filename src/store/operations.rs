use crate::config::SetOptions;
use crate::error::{Error, Result};
use crate::events::{ChangeEvent, DispatchScope, Observer};
use crate::key_path::IntoKeyPath;
use crate::storage::StorageBackend;
use crate::store::SettingsStore;
use crate::store::io::kind_of;

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

impl<S: StorageBackend> SettingsStore<S> {
    /// Check whether a value exists at `key_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key path is invalid or the document cannot be loaded.
    pub fn has(&self, key_path: impl IntoKeyPath) -> Result<bool> {
        let key_path = key_path.into_key_path()?;
        self.cache.read(
            || self.load_document(),
            |doc| key_path.resolve(doc).is_some(),
        )
    }

    /// Get the value at `key_path`.
    ///
    /// If nothing is stored there and `default` is given, the default is
    /// written at `key_path` (persisted and observed like [`set`](Self::set))
    /// and returned. Without a default, a missing value yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key path is invalid, the document cannot be
    /// loaded, or writing the default fails.
    pub fn get(
        &self,
        key_path: impl IntoKeyPath,
        default: Option<Value>,
    ) -> Result<Option<Value>> {
        let key_path = key_path.into_key_path()?;

        let found = self.cache.read(
            || self.load_document(),
            |doc| key_path.resolve(doc).cloned(),
        )?;
        let Some(default) = default else {
            return Ok(found);
        };
        if found.is_some() {
            return Ok(found);
        }

        let value = self.mutate(
            DispatchScope::path(&key_path),
            &SetOptions::default(),
            false,
            |doc| {
                // Another caller may have filled it in since the read above
                if let Some(existing) = key_path.resolve(doc) {
                    return Ok((false, existing.clone()));
                }
                key_path.assign(doc, default.clone())?;
                Ok((true, default))
            },
        )?;

        debug!("Applied default for {key_path}");
        Ok(Some(value))
    }

    /// Get the value at `key_path`, deserialized into `T`.
    ///
    /// Unlike [`get`](Self::get) this never writes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the stored value does not
    /// deserialize into `T`, or any error [`has`](Self::has) can return.
    pub fn get_as<T: DeserializeOwned>(&self, key_path: impl IntoKeyPath) -> Result<Option<T>> {
        let key_path = key_path.into_key_path()?;
        let found = self.cache.read(
            || self.load_document(),
            |doc| key_path.resolve(doc).cloned(),
        )?;

        found
            .map(|value| {
                serde_json::from_value(value).map_err(|e| Error::TypeMismatch {
                    key_path: key_path.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    /// Get a copy of the whole settings document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn get_all(&self) -> Result<Value> {
        self.cache.read(|| self.load_document(), Clone::clone)
    }

    /// Set `value` at `key_path` using the store's default options.
    ///
    /// See [`set_with`](Self::set_with).
    ///
    /// # Errors
    ///
    /// Same as [`set_with`](Self::set_with).
    pub fn set(&self, key_path: impl IntoKeyPath, value: impl Into<Value>) -> Result<&Self> {
        self.set_with(key_path, value, &SetOptions::default())
    }

    /// Set `value` at `key_path`, creating intermediate objects as needed.
    ///
    /// The document is written to the backing file and observers on
    /// overlapping key paths are notified. Setting a value equal to the
    /// current one is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The key path is invalid
    /// * A value along the path exists but is not an object
    /// * The document cannot be loaded or written
    pub fn set_with(
        &self,
        key_path: impl IntoKeyPath,
        value: impl Into<Value>,
        options: &SetOptions,
    ) -> Result<&Self> {
        let key_path = key_path.into_key_path()?;
        let value = value.into();

        let changed = self.mutate(DispatchScope::path(&key_path), options, false, |doc| {
            if key_path.resolve(doc) == Some(&value) {
                return Ok((false, false));
            }
            key_path.assign(doc, value)?;
            Ok((true, true))
        })?;

        if changed {
            debug!("Set {key_path}");
        } else {
            debug!("Setting {key_path} unchanged, skipping notify");
        }
        Ok(self)
    }

    /// Replace the whole document using the store's default options.
    ///
    /// See [`set_all_with`](Self::set_all_with).
    ///
    /// # Errors
    ///
    /// Same as [`set_all_with`](Self::set_all_with).
    pub fn set_all(&self, document: Value) -> Result<&Self> {
        self.set_all_with(document, &SetOptions::default())
    }

    /// Replace the whole document with `document`.
    ///
    /// The backing file is always rewritten. Every observer whose value
    /// differs in the new document is notified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] if `document` is not a JSON object,
    /// or an error if the document cannot be loaded or written.
    pub fn set_all_with(&self, document: Value, options: &SetOptions) -> Result<&Self> {
        if !document.is_object() {
            return Err(Error::InvalidDocument(format!(
                "settings root must be an object, got {}",
                kind_of(&document)
            )));
        }

        self.mutate(DispatchScope::All, options, true, |doc| {
            let changed = *doc != document;
            *doc = document;
            Ok((changed, ()))
        })?;

        info!("All settings replaced");
        Ok(self)
    }

    /// Delete the value at `key_path` using the store's default options.
    ///
    /// See [`delete_with`](Self::delete_with).
    ///
    /// # Errors
    ///
    /// Same as [`delete_with`](Self::delete_with).
    pub fn delete(&self, key_path: impl IntoKeyPath) -> Result<&Self> {
        self.delete_with(key_path, &SetOptions::default())
    }

    /// Delete the value at `key_path`.
    ///
    /// Deleting a path that does not exist is a no-op. Observers on the
    /// deleted path (and its descendants) see `None` as the new value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key path is invalid or the document cannot be
    /// loaded or written.
    pub fn delete_with(&self, key_path: impl IntoKeyPath, options: &SetOptions) -> Result<&Self> {
        let key_path = key_path.into_key_path()?;

        let removed = self.mutate(DispatchScope::path(&key_path), options, false, |doc| {
            let removed = key_path.remove(doc).is_some();
            Ok((removed, removed))
        })?;

        if removed {
            debug!("Deleted {key_path}");
        } else {
            debug!("Delete of {key_path} skipped, nothing stored there");
        }
        Ok(self)
    }

    /// Delete every setting using the store's default options.
    ///
    /// # Errors
    ///
    /// Same as [`delete_all_with`](Self::delete_all_with).
    pub fn delete_all(&self) -> Result<&Self> {
        self.delete_all_with(&SetOptions::default())
    }

    /// Reset the document to an empty object and rewrite the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or written.
    pub fn delete_all_with(&self, options: &SetOptions) -> Result<&Self> {
        self.mutate(DispatchScope::All, options, true, |doc| {
            let changed = doc.as_object().is_none_or(|map| !map.is_empty());
            *doc = Value::Object(Map::new());
            Ok((changed, ()))
        })?;

        info!("All settings deleted");
        Ok(self)
    }

    /// Watch `key_path` for changes.
    ///
    /// `handler` runs synchronously after every mutation that changes the
    /// value resolved at `key_path`, including changes made through an
    /// ancestor or descendant path, `set_all`, `delete_all` and `reload`.
    /// Values are compared structurally, so rewriting an equal value does
    /// not fire.
    ///
    /// # Errors
    ///
    /// Returns an error if the key path is invalid or the document cannot be
    /// loaded (the current value seeds change detection).
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # let store = dotsettings::SettingsStore::builder("my-app").build()?;
    /// let observer = store.watch("ui.theme", |event| {
    ///     println!("theme: {:?} -> {:?}", event.old_value(), event.new_value());
    /// })?;
    ///
    /// store.set("ui.theme", "dark")?;
    /// observer.dispose();
    /// # Ok::<(), dotsettings::Error>(())
    /// ```
    pub fn watch<F>(&self, key_path: impl IntoKeyPath, handler: F) -> Result<Observer>
    where
        F: Fn(&ChangeEvent<'_>) + Send + Sync + 'static,
    {
        let key_path = key_path.into_key_path()?;
        let current = self.cache.read(
            || self.load_document(),
            |doc| key_path.resolve(doc).cloned(),
        )?;

        debug!("Watching {key_path}");
        Ok(self.observers.register(key_path, current, Box::new(handler)))
    }
}

// =============================================================================
// Tests
// =============================================================================
