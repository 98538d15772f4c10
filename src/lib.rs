//! # dotsettings - key-path settings backed by a JSON file
//!
//! A small settings store for desktop applications. Values live in one JSON
//! document addressed with dotted key paths (`"window.bounds.width"`), and
//! every change is written straight back to the backing file.
//!
//! ## Features
//!
//! - **Key paths**: read, write and delete nested values; intermediate objects
//!   are created on write
//! - **Write-through persistence**: memory and file agree after every mutation,
//!   with atomic temp-file-and-rename saves
//! - **Observers**: watch a key path and get `(new, old)` on every real change,
//!   including changes made through a parent or child path
//! - **Typed reads**: deserialize any value with `serde`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dotsettings::SettingsStore;
//! use serde_json::json;
//!
//! # fn main() -> dotsettings::Result<()> {
//! let store = SettingsStore::builder("my-app").build()?;
//!
//! store.set("ui.theme", "dark")?.set("ui.font_size", 14)?;
//!
//! // Missing values can be defaulted (and the default is saved)
//! let zoom = store.get("ui.zoom", Some(json!(1.0)))?;
//! assert_eq!(zoom, Some(json!(1.0)));
//!
//! let font_size: Option<u32> = store.get_as("ui.font_size")?;
//! assert_eq!(font_size, Some(14));
//! # Ok(())
//! # }
//! ```
//!
//! ## Watching for Changes
//!
//! ```rust,no_run
//! use dotsettings::SettingsStore;
//!
//! # fn main() -> dotsettings::Result<()> {
//! let store = SettingsStore::builder("my-app").build()?;
//!
//! let observer = store.watch("ui", |event| {
//!     println!("ui changed: {:?} -> {:?}", event.old_value(), event.new_value());
//! })?;
//!
//! store.set("ui.theme", "light")?; // fires: "ui" contains the changed key
//! store.set("ui.theme", "light")?; // equal value, does not fire
//!
//! observer.dispose();
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Path Syntax
//!
//! Segments are separated by `.`; write `\.` for a literal dot and `\\` for a
//! literal backslash. Empty segments are rejected. Segments only address
//! object keys, so arrays are stored and returned whole.

// Core modules
mod error;
mod events;
mod key_path;
pub mod storage;
mod store;
mod sync;

// Grouped modules
pub mod config;

// Re-exports from core
pub use error::{Error, Result};
pub use events::{ChangeEvent, ChangeHandler, Observer};
pub use key_path::{IntoKeyPath, KeyPath};
pub use storage::{JsonStorage, StorageBackend, WriteOptions};
pub use store::{SettingsStore, SettingsStoreBuilder};

// Re-exports from config
pub use config::{DEFAULT_FILE_NAME, SetOptions, StoreConfig, StoreConfigBuilder};
