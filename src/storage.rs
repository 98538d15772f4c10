//! Storage backend trait and the JSON implementation

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// How a document is written to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Human-readable output
    pub pretty: bool,
    /// Write to a sibling temp file, then rename over the target
    pub atomic: bool,
    /// Unix only: owner-only permissions on created directories and the file
    pub secure: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            atomic: true,
            secure: false,
        }
    }
}

/// Trait for storage backend implementations
///
/// The store only ever hands whole documents to the backend, so a backend is
/// just a codec plus file handling.
pub trait StorageBackend: Clone + Send + Sync {
    /// Serialize a document to a string
    fn serialize(&self, document: &Value, pretty: bool) -> Result<String>;

    /// Deserialize a document from a string
    fn deserialize(&self, content: &str) -> Result<Value>;

    /// Read and deserialize the file at `path`.
    ///
    /// Returns `Ok(None)` if the file does not exist. An empty or
    /// whitespace-only file reads as an empty object.
    fn read(&self, path: &Path) -> Result<Option<Value>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Some(Value::Object(Map::new())));
        }

        self.deserialize(&content)
            .map(Some)
            .map_err(|e| Error::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Serialize and write a document to `path`, creating parent directories.
    fn write(&self, path: &Path, document: &Value, options: &WriteOptions) -> Result<()> {
        let content = self.serialize(document, options.pretty)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent, options.secure)?;
        }

        if !options.atomic {
            write_file(path, &content, options.secure)?;
            return Ok(());
        }

        // Append .tmp so the original filename is preserved in full
        let file_name = path.file_name().ok_or_else(|| {
            Error::Config(format!(
                "Invalid path '{}': must have a filename",
                path.display()
            ))
        })?;
        let mut temp_name = file_name.to_os_string();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        write_file(&temp_path, &content, options.secure)?;

        std::fs::rename(&temp_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            Error::FileWrite {
                path: path.to_path_buf(),
                source: e,
            }
        })
    }
}

fn ensure_dir(path: &Path, secure: bool) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreate {
        path: path.to_path_buf(),
        source: e,
    })?;
    if secure {
        restrict_permissions(path, 0o700)?;
    }
    Ok(())
}

fn write_file(path: &Path, content: &str, secure: bool) -> Result<()> {
    std::fs::write(path, content).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    if secure {
        restrict_permissions(path, 0o600)?;
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
        Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// No-op on Windows (permissions managed via ACLs)
#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

// =============================================================================
// JSON Storage Implementation
// =============================================================================

/// JSON storage backend (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStorage;

impl JsonStorage {
    /// Create a new JSON storage backend
    pub fn new() -> Self {
        Self
    }
}

impl StorageBackend for JsonStorage {
    fn serialize(&self, document: &Value, pretty: bool) -> Result<String> {
        if pretty {
            serde_json::to_string_pretty(document).map_err(Error::from)
        } else {
            serde_json::to_string(document).map_err(Error::from)
        }
    }

    fn deserialize(&self, content: &str) -> Result<Value> {
        serde_json::from_str(content).map_err(Error::from)
    }
}

// =============================================================================
// Tests
// =============================================================================
