use crate::config::SetOptions;
use crate::error::{Error, Result};
use crate::events::DispatchScope;
use crate::storage::StorageBackend;
use crate::store::SettingsStore;

use log::{debug, info};
use serde_json::{Map, Value};

impl<S: StorageBackend> SettingsStore<S> {
    /// Read the backing file, defaulting to an empty object if it is missing
    pub(crate) fn load_document(&self) -> Result<Value> {
        let path = self.file();
        match self.config.storage.read(path)? {
            Some(Value::Object(map)) => {
                debug!("Loaded settings from {}", path.display());
                Ok(Value::Object(map))
            }
            Some(other) => Err(Error::Parse {
                path: path.to_path_buf(),
                reason: format!("root must be a JSON object, found {}", kind_of(&other)),
            }),
            None => {
                debug!("No settings file at {}, starting empty", path.display());
                Ok(Value::Object(Map::new()))
            }
        }
    }

    /// Write the document to the backing file
    pub(crate) fn persist(&self, document: &Value, options: &SetOptions) -> Result<()> {
        let write_options = self.config.write_options(options);
        self.config
            .storage
            .write(self.file(), document, &write_options)?;
        debug!("Settings written to {}", self.file().display());
        Ok(())
    }

    /// Apply a mutation under the document lock, persist, then notify.
    ///
    /// `apply` returns whether the document changed plus an output. Unchanged
    /// documents skip the write unless `always_persist` is set or a previous
    /// write failed. Observers only hear about mutations that reached disk;
    /// changes held back by a failed write are delivered on the next
    /// successful one, whatever path it touches.
    pub(crate) fn mutate<R, F>(
        &self,
        scope: DispatchScope,
        options: &SetOptions,
        always_persist: bool,
        apply: F,
    ) -> Result<R>
    where
        F: FnOnce(&mut Value) -> Result<(bool, R)>,
    {
        let (dispatch, output) = self.cache.write(
            || self.load_document(),
            |state| {
                let (changed, output) = apply(&mut state.document)?;
                let was_dirty = state.dirty;
                if !changed && !always_persist && !was_dirty {
                    return Ok((None, output));
                }

                state.dirty = true;
                self.persist(&state.document, options)?;
                state.dirty = false;

                // Held-back changes may sit anywhere in the document
                let dispatch = if was_dirty {
                    Some(DispatchScope::All)
                } else {
                    changed.then_some(scope)
                };
                Ok((dispatch, output))
            },
        )?;

        if let Some(scope) = dispatch {
            self.notify(scope);
        }

        Ok(output)
    }

    /// Deliver changes in `scope` to observers.
    ///
    /// Runs after the document lock is released. If a dispatch is already in
    /// progress the request is merged into it and this returns at once; the
    /// running drain re-resolves against the latest document.
    pub(crate) fn notify(&self, scope: DispatchScope) {
        if self.observers.is_empty() || !self.observers.enqueue(scope) {
            return;
        }

        while let Some(scope) = self.observers.next_pending() {
            if let Some(document) = self.cache.snapshot() {
                self.observers.dispatch(&document, &scope);
            }
        }
    }

    /// Re-read the backing file, replacing the in-memory document.
    ///
    /// Use this after the file was modified outside this store. Observers are
    /// notified of every value that differs from what they last saw. Any
    /// unsaved in-memory changes from a failed write are discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed; the in-memory
    /// document is left as it was.
    pub fn reload(&self) -> Result<&Self> {
        let document = self.load_document()?;
        self.cache.replace(document);
        self.notify(DispatchScope::All);

        info!("Settings reloaded from {}", self.file().display());
        Ok(self)
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
