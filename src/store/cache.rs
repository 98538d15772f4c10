//! Lazily loaded document cache for `SettingsStore`
//!
//! Encapsulates the double-checked locking around the in-memory document.

use crate::error::Result;
use crate::sync::RwLockExt;
use serde_json::Value;
use std::sync::RwLock;

pub(crate) struct DocumentState {
    /// The settings document; root is always an object
    pub document: Value,
    /// Set while memory is ahead of the backing file after a failed write
    pub dirty: bool,
}

pub(crate) struct DocumentCache {
    state: RwLock<Option<DocumentState>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state.read_recovered().is_some()
    }

    /// Run `f` against the document, loading it first if needed
    pub fn read<R, L, F>(&self, load: L, f: F) -> Result<R>
    where
        L: FnOnce() -> Result<Value>,
        F: FnOnce(&Value) -> R,
    {
        {
            let guard = self.state.read_recovered();
            if let Some(state) = guard.as_ref() {
                return Ok(f(&state.document));
            }
        }

        let mut guard = self.state.write_recovered();
        let state = populate(&mut guard, load)?;
        Ok(f(&state.document))
    }

    /// Run `f` with exclusive access to the document, loading it first if needed
    pub fn write<R, L, F>(&self, load: L, f: F) -> Result<R>
    where
        L: FnOnce() -> Result<Value>,
        F: FnOnce(&mut DocumentState) -> Result<R>,
    {
        let mut guard = self.state.write_recovered();
        let state = populate(&mut guard, load)?;
        f(state)
    }

    /// Copy of the current document, `None` if it was never loaded
    pub fn snapshot(&self) -> Option<Value> {
        self.state
            .read_recovered()
            .as_ref()
            .map(|state| state.document.clone())
    }

    /// Replace the document with a freshly loaded one
    pub fn replace(&self, document: Value) {
        *self.state.write_recovered() = Some(DocumentState {
            document,
            dirty: false,
        });
    }
}

fn populate<L>(slot: &mut Option<DocumentState>, load: L) -> Result<&mut DocumentState>
where
    L: FnOnce() -> Result<Value>,
{
    // Another thread may have loaded between our read and write lock
    let state = match *slot {
        Some(ref mut state) => state,
        None => slot.insert(DocumentState {
            document: load()?,
            dirty: false,
        }),
    };
    Ok(state)
}
