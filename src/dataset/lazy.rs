//! Load-once handles for optional dataset documents

use super::types::{CorpusIndex, StylePriors};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// A dataset document that can be loaded without failing the caller
pub trait LenientLoad: Sized {
    /// Loads the first usable document among `candidates`, or `None`
    fn load_lenient(candidates: &[PathBuf]) -> Option<Self>;
}

/// Lazily loaded, process-lifetime handle to a dataset document
///
/// The first call to [`LazyDataset::get`] probes the candidate paths once;
/// every later call returns the memoized outcome, including a failed load.
/// Concurrent first callers block until the single load completes.
#[derive(Debug)]
pub struct LazyDataset<T> {
    candidates: Vec<PathBuf>,
    cell: OnceLock<Option<Arc<T>>>,
}

/// Handle to the corpus index
pub type LazyCorpus = LazyDataset<CorpusIndex>;

/// Handle to the style priors document
pub type LazyPriors = LazyDataset<StylePriors>;

impl<T: LenientLoad> LazyDataset<T> {
    /// Creates a handle that will probe `candidates` in order on first use
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            cell: OnceLock::new(),
        }
    }

    /// Creates a handle around a document that is already in memory
    pub fn preloaded(document: T) -> Self {
        Self {
            candidates: Vec::new(),
            cell: OnceLock::from(Some(Arc::new(document))),
        }
    }

    /// Creates a handle that always reports the document as unavailable
    pub fn unavailable() -> Self {
        Self {
            candidates: Vec::new(),
            cell: OnceLock::from(None),
        }
    }

    /// Returns the document, loading it on the first call
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell
            .get_or_init(|| T::load_lenient(&self.candidates).map(Arc::new))
            .clone()
    }

    /// Paths probed on first access
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }
}
