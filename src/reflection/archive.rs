//! Snapshots loaded from a JSON document
//!
//! The document is either a single snapshot object or
//! `{"extensions": [snapshot, ...]}`. `php-stubgen --dump-snapshot` writes the
//! single-object form.

use super::{ExtensionSnapshot, IntrospectionProvider};
use crate::error::{SnapshotError, StubError};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Top-level keys needed to tell the two document forms apart
#[derive(Deserialize)]
struct DocumentShape {
    #[serde(default)]
    extensions: Option<IgnoredAny>,
}

/// Multi-extension form of the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotArchive {
    pub extensions: Vec<ExtensionSnapshot>,
}

impl SnapshotArchive {
    pub fn new(extensions: Vec<ExtensionSnapshot>) -> Self {
        Self { extensions }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let shape: DocumentShape = serde_json::from_str(text)?;
        if shape.extensions.is_some() {
            serde_json::from_str(text)
        } else {
            Ok(Self::new(vec![serde_json::from_str(text)?]))
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, StubError> {
        let load = || -> Result<Self, SnapshotError> {
            let text = fs::read_to_string(path)?;
            Ok(Self::from_json(&text)?)
        };
        let archive = load().map_err(|source| StubError::Snapshot {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            extensions = archive.extensions.len(),
            "snapshot archive loaded"
        );
        Ok(archive)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl IntrospectionProvider for SnapshotArchive {
    fn extension_names(&self) -> Vec<String> {
        self.extensions.iter().map(|e| e.name.clone()).collect()
    }

    fn snapshot(&self, extension: &str) -> Result<ExtensionSnapshot, StubError> {
        self.extensions
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(extension))
            .cloned()
            .ok_or_else(|| StubError::ExtensionNotFound(extension.to_string()))
    }
}
