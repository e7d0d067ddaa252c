//! Corpus integrity checks

use super::tempo::extract_tempo;
use super::types::CorpusIndex;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// Highest tempo value considered plausible for an entry
const MAX_PLAUSIBLE_TEMPO: f64 = 300.0;

/// Outcome of an integrity check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Problems that break corpus invariants
    pub errors: Vec<String>,
    /// Problems that degrade retrieval quality only
    pub warnings: Vec<String>,
}

impl IndexReport {
    /// True when no errors were found
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Checks the corpus invariants
///
/// Errors: duplicate or missing ids, missing titles, empty `prompt_seeds`.
/// Warnings: an empty corpus, empty snippets, implausible tempo values and a
/// recorded `cpm` that disagrees with the tempo the snippet declares.
///
/// # Examples
///
/// ```
/// use audial::dataset::{check_index, CorpusIndex};
///
/// let report = check_index(&CorpusIndex::default());
/// assert!(report.is_valid());
/// assert_eq!(report.warnings, vec!["Index contains no songs".to_string()]);
/// ```
pub fn check_index(index: &CorpusIndex) -> IndexReport {
    let mut report = IndexReport::default();

    if index.songs.is_empty() {
        report.warnings.push("Index contains no songs".to_string());
        return report;
    }

    let mut seen = HashSet::new();
    for song in &index.songs {
        if !song.id.is_empty() && !seen.insert(song.id.as_str()) {
            report.errors.push(format!("Duplicate ID: {}", song.id));
        }
    }

    for (i, song) in index.songs.iter().enumerate() {
        let prefix = format!("Song {} ({}):", i + 1, song.id);

        if song.id.trim().is_empty() {
            report.errors.push(format!("{} missing 'id'", prefix));
        }
        if song.title.trim().is_empty() {
            report.errors.push(format!("{} missing 'title'", prefix));
        }
        if song.prompt_seeds.is_empty() {
            report
                .errors
                .push(format!("{} 'prompt_seeds' must not be empty", prefix));
        }
        if song.snippet.is_empty() {
            report.warnings.push(format!("{} 'snippet' is empty", prefix));
        }
        for (label, value) in [("BPM", song.bpm), ("CPM", song.cpm)] {
            if let Some(value) = value {
                if !(0.0..=MAX_PLAUSIBLE_TEMPO).contains(&value) {
                    report
                        .warnings
                        .push(format!("{} invalid {} value: {}", prefix, label, value));
                }
            }
        }
        if let (Some(cpm), Some(declared)) = (song.cpm, extract_tempo(&song.snippet)) {
            if cpm.round() != f64::from(declared) {
                report.warnings.push(format!(
                    "{} 'cpm' is {} but snippet declares {}",
                    prefix, cpm, declared
                ));
            }
        }
    }

    report
}

/// Lists entries whose source file is absent from every collection directory
pub fn missing_sources(index: &CorpusIndex, collection_dirs: &[PathBuf]) -> Vec<String> {
    index
        .songs
        .iter()
        .filter_map(|song| {
            let source = song.source_path.as_deref()?;
            let found = collection_dirs.iter().any(|dir| dir.join(source).is_file());
            (!found).then(|| format!("{}: source file not found: {}", song.id, source))
        })
        .collect()
}
