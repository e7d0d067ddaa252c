//! Corpus index loading
//!
//! The corpus document is optional at runtime: a missing or malformed index
//! degrades retrieval to "no exemplars" instead of failing the caller.

use super::integrity::check_index;
use super::lazy::LenientLoad;
use super::types::CorpusIndex;
use crate::error::{AudialError, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

impl CorpusIndex {
    /// Reads and decodes a corpus document, failing on any error.
    ///
    /// # Errors
    ///
    /// Returns `AudialError::Dataset` when the file cannot be read or decoded
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path.as_ref())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// True when the corpus has no entries
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Looks up an entry by id
    pub fn get(&self, id: &str) -> Option<&super::types::CorpusEntry> {
        self.songs.iter().find(|song| song.id == id)
    }
}

impl LenientLoad for CorpusIndex {
    /// Loads the first readable corpus document among `candidates`.
    ///
    /// Never fails: unreadable or malformed documents are logged and `None`
    /// is returned. Integrity problems are logged but do not block loading.
    fn load_lenient(candidates: &[PathBuf]) -> Option<Self> {
        let path = find_existing(candidates)?;
        match Self::from_file(&path) {
            Ok(index) => {
                let report = check_index(&index);
                for error in &report.errors {
                    tracing::warn!(path = %path.display(), "Corpus integrity: {}", error);
                }
                tracing::info!(
                    path = %path.display(),
                    songs = index.songs.len(),
                    "Loaded corpus index"
                );
                Some(index)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Corpus index unavailable: {}", e);
                None
            }
        }
    }
}

pub(crate) fn find_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    let found = candidates.iter().find(|p| p.is_file()).cloned();
    if found.is_none() {
        tracing::debug!(?candidates, "No dataset file found in candidate paths");
    }
    found
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AudialError::Dataset(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        AudialError::Dataset(format!("Failed to parse {}: {}", path.display(), e)).into()
    })
}
