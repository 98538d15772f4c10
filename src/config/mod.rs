//! Store configuration
//!
//! - `StoreConfig` - where the backing file lives and how it is written
//! - `StoreConfigBuilder` - fluent construction with platform defaults
//! - `SetOptions` - per-call overrides for mutating operations

mod options;
mod types;

pub use options::SetOptions;
pub use types::{DEFAULT_FILE_NAME, StoreConfig, StoreConfigBuilder};
