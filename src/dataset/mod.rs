//! Reference corpus: entry types, lenient loading and offline-tooling helpers
//!
//! Both dataset documents are optional. Loaders log and return `None` when a
//! document is missing or malformed, and callers treat that as an empty
//! corpus or absent hints.

pub mod index;
pub mod integrity;
pub mod lazy;
pub mod priors;
pub mod snippet;
pub mod tempo;
pub mod types;

pub use integrity::{check_index, missing_sources, IndexReport};
pub use lazy::{LazyCorpus, LazyDataset, LazyPriors, LenientLoad};
pub use snippet::{extract_snippet, read_snippet};
pub use tempo::extract_tempo;
pub use types::{CorpusEntry, CorpusIndex, NamedCount, StylePriors, TempoBucket, VoiceCount};

use crate::config::DatasetConfig;

/// Dataset handles built from configuration
///
/// Constructed once at startup and passed by reference to the retriever and
/// the prompt builder.
#[derive(Debug)]
pub struct Dataset {
    pub corpus: LazyCorpus,
    pub priors: LazyPriors,
    pub collection_dirs: Vec<std::path::PathBuf>,
}

impl Dataset {
    /// Creates unloaded handles for the configured candidate paths
    pub fn from_config(config: &DatasetConfig) -> Self {
        Self {
            corpus: LazyCorpus::new(config.index_candidates()),
            priors: LazyPriors::new(config.priors_candidates()),
            collection_dirs: config.collection_dirs(),
        }
    }

    /// Wraps in-memory documents
    pub fn in_memory(index: CorpusIndex, priors: Option<StylePriors>) -> Self {
        Self {
            corpus: LazyCorpus::preloaded(index),
            priors: priors.map_or_else(LazyPriors::unavailable, LazyPriors::preloaded),
            collection_dirs: Vec::new(),
        }
    }
}
