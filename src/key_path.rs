//! Dotted key paths into a JSON settings document
//!
//! A key path such as `"window.bounds.width"` addresses a nested value. Each
//! segment names an object key; arrays are treated as leaf values and are never
//! indexed into.
//!
//! A literal dot inside a segment is written `\.` and a literal backslash `\\`:
//!
//! ```
//! use dotsettings::KeyPath;
//!
//! let path = KeyPath::parse(r"hosts.example\.com.port")?;
//! assert_eq!(path.segments(), ["hosts", "example.com", "port"]);
//! assert_eq!(path.to_string(), r"hosts.example\.com.port");
//! # Ok::<(), dotsettings::Error>(())
//! ```

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A parsed, non-empty key path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath {
    /// Unescaped segments; never empty and no segment is empty
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a dotted key path, honoring `\.` and `\\` escapes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKeyPath`] for an empty path, an empty segment
    /// (leading, trailing or doubled dot) or a malformed escape.
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(invalid(input, "key path is empty"));
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = input.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped @ ('.' | '\\')) => current.push(escaped),
                    Some(other) => {
                        return Err(invalid(input, &format!("unsupported escape '\\{other}'")));
                    }
                    None => return Err(invalid(input, "dangling '\\' at end of key path")),
                },
                '.' => {
                    if current.is_empty() {
                        return Err(invalid(input, "key path contains an empty segment"));
                    }
                    segments.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            }
        }

        if current.is_empty() {
            return Err(invalid(input, "key path contains an empty segment"));
        }
        segments.push(current);

        Ok(Self { segments })
    }

    /// Build a key path from literal (unescaped) segments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKeyPath`] if there are no segments or any segment is empty.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        let path = Self { segments };
        if path.segments.is_empty() {
            return Err(invalid("", "key path is empty"));
        }
        if path.segments.iter().any(String::is_empty) {
            return Err(invalid(&path.to_string(), "key path contains an empty segment"));
        }
        Ok(path)
    }

    /// Unescaped segments of this path
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// True if `self` equals `other` or is an ancestor of it
    #[must_use]
    pub fn is_prefix_of(&self, other: &KeyPath) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// True if a change at one path can change the value at the other
    #[must_use]
    pub fn overlaps(&self, other: &KeyPath) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }

    /// Look up the value at this path.
    #[must_use]
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |node, segment| node.as_object()?.get(segment))
    }

    /// Assign `value` at this path, creating missing intermediate objects.
    ///
    /// Returns the previous value, if any. Intermediate objects are only created
    /// below the first missing segment, so an error leaves `root` untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAnObject`] if an existing value along the path is not
    /// an object.
    pub fn assign(&self, root: &mut Value, value: Value) -> Result<Option<Value>> {
        let (last, parents) = self.split_last()?;

        let mut node = root;
        for (depth, segment) in parents.iter().enumerate() {
            node = match node {
                Value::Object(map) => map
                    .entry(segment.clone())
                    .or_insert_with(|| Value::Object(Map::new())),
                _ => return Err(self.not_an_object(depth)),
            };
        }

        match node {
            Value::Object(map) => Ok(map.insert(last.clone(), value)),
            _ => Err(self.not_an_object(parents.len())),
        }
    }

    /// Remove the value at this path, returning it if it was present.
    pub fn remove(&self, root: &mut Value) -> Option<Value> {
        let (last, parents) = self.segments.split_last()?;
        let mut node = root;
        for segment in parents {
            node = node.as_object_mut()?.get_mut(segment)?;
        }
        node.as_object_mut()?.shift_remove(last)
    }

    fn split_last(&self) -> Result<(&String, &[String])> {
        self.segments
            .split_last()
            .ok_or_else(|| invalid("", "key path is empty"))
    }

    fn not_an_object(&self, depth: usize) -> Error {
        // depth 0 is the document root itself
        let prefix = &self.segments[..depth.max(1).min(self.segments.len())];
        Error::NotAnObject {
            key_path: join_escaped(prefix),
        }
    }
}

fn invalid(input: &str, reason: &str) -> Error {
    Error::InvalidKeyPath {
        key_path: input.to_string(),
        reason: reason.to_string(),
    }
}

fn escape_segment(segment: &str) -> String {
    segment.replace('\\', "\\\\").replace('.', "\\.")
}

fn join_escaped(segments: &[String]) -> String {
    segments
        .iter()
        .map(|s| escape_segment(s))
        .collect::<Vec<_>>()
        .join(".")
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_escaped(&self.segments))
    }
}

impl FromStr for KeyPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Anything the store accepts where a key path is expected
pub trait IntoKeyPath {
    /// Convert into a parsed [`KeyPath`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKeyPath`] if the input is not a valid key path.
    fn into_key_path(self) -> Result<KeyPath>;
}

impl IntoKeyPath for KeyPath {
    fn into_key_path(self) -> Result<KeyPath> {
        Ok(self)
    }
}

impl IntoKeyPath for &KeyPath {
    fn into_key_path(self) -> Result<KeyPath> {
        Ok(self.clone())
    }
}

impl IntoKeyPath for &str {
    fn into_key_path(self) -> Result<KeyPath> {
        KeyPath::parse(self)
    }
}

impl IntoKeyPath for String {
    fn into_key_path(self) -> Result<KeyPath> {
        KeyPath::parse(&self)
    }
}

impl IntoKeyPath for &String {
    fn into_key_path(self) -> Result<KeyPath> {
        KeyPath::parse(self)
    }
}

// =============================================================================
// Tests
// =============================================================================
