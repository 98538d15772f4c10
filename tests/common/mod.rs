//! Common test utilities for dotsettings integration tests
//!
//! Provides a temp-dir backed store fixture and helpers for inspecting the
//! backing file.

#![allow(dead_code)]

use dotsettings::{ChangeEvent, SettingsStore, StoreConfig};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// =============================================================================
// Test Fixtures
// =============================================================================

/// Test fixture that provides a temporary directory and a configured store
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub store: SettingsStore,
}

impl TestFixture {
    /// Create a new test fixture with default configuration
    pub fn new() -> Self {
        init_logging();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = StoreConfig::builder("test-app")
            .config_dir(temp_dir.path())
            .build()
            .expect("Failed to build config");

        Self {
            temp_dir,
            store: SettingsStore::new(config),
        }
    }

    /// Create a fixture whose writes are pretty-printed by default
    pub fn pretty() -> Self {
        init_logging();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SettingsStore::builder("test-app")
            .config_dir(temp_dir.path())
            .prettify(true)
            .build()
            .expect("Failed to build store");

        Self { temp_dir, store }
    }

    /// Open a second store on the same backing file
    pub fn reopen(&self) -> SettingsStore {
        SettingsStore::builder("test-app")
            .config_dir(self.temp_dir.path())
            .build()
            .expect("Failed to build store")
    }

    /// Get the backing file path
    pub fn settings_path(&self) -> PathBuf {
        self.temp_dir.path().join(dotsettings::DEFAULT_FILE_NAME)
    }

    /// Replace the backing file contents behind the store's back
    pub fn write_raw(&self, content: &str) {
        std::fs::write(self.settings_path(), content).expect("Failed to write settings file");
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Install env_logger once for the test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Read the raw settings file content
pub fn read_raw(fixture: &TestFixture) -> Option<String> {
    std::fs::read_to_string(fixture.settings_path()).ok()
}

/// Read and parse the settings file
pub fn read_settings_file(fixture: &TestFixture) -> Option<Value> {
    read_raw(fixture).and_then(|content| serde_json::from_str(&content).ok())
}

/// (new, old) pairs captured by a recording handler
pub type Recorded = Arc<Mutex<Vec<(Option<Value>, Option<Value>)>>>;

/// Build a handler that records every change it sees
pub fn recorder() -> (Recorded, impl Fn(&ChangeEvent<'_>) + Send + Sync + 'static) {
    let seen: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handler = move |event: &ChangeEvent<'_>| {
        sink.lock()
            .unwrap()
            .push((event.new_value().cloned(), event.old_value().cloned()));
    };
    (seen, handler)
}
