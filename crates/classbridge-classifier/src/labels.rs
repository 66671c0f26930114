//! Label-map loading
//!
//! The label artifact maps quoted integer keys `"0"`..`"C-1"` to quoted display
//! names. For each key the first textual occurrence is located and the next
//! quoted string after it becomes the slot value. Missing keys leave empty
//! slots; only failing to read the artifact is an error.

use classbridge_core::{Artifact, Error, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Ordered class display names, always exactly `class_count` slots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    labels: Vec<String>,
}

impl LabelMap {
    /// Build a map from names in class order
    pub fn from_names(names: Vec<String>) -> Self {
        Self { labels: names }
    }

    /// Extract `class_count` labels from artifact text
    pub fn parse(content: &str, class_count: usize) -> Self {
        let labels = (0..class_count)
            .map(|idx| find_label(content, idx).unwrap_or_default())
            .collect();
        Self { labels }
    }

    /// Read a label artifact from disk
    pub fn load(path: impl AsRef<Path>, class_count: usize) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::open(Artifact::Labels, path, e))?;
        let map = Self::parse(&String::from_utf8_lossy(&bytes), class_count);

        let missing = map.missing();
        if !missing.is_empty() {
            warn!(path = %path.display(), ?missing, "Label map has empty slots");
        }
        debug!(path = %path.display(), classes = class_count, "Loaded label map");

        Ok(map)
    }

    /// Display name for a class index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    /// Indices whose key was not found in the artifact
    pub fn missing(&self) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_empty())
            .map(|(i, _)| i)
            .collect()
    }
}

fn find_label(content: &str, index: usize) -> Option<String> {
    let key = format!("\"{}\"", index);
    let pos = content.find(&key)?;

    let rest = &content[pos + key.len()..];
    let open = rest.find('"')?;
    let value = &rest[open + 1..];
    let close = value.find('"')?;

    Some(value[..close].to_string())
}
