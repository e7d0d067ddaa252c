//! Test utilities for Audial
//!
//! This module provides common test utilities: temporary directories, test
//! files, assertion helpers and a small in-memory reference corpus.

use crate::dataset::{CorpusEntry, CorpusIndex};
use crate::retrieval::normalize;
use std::fmt::Display;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T, E: Display>(result: Result<T, E>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// A valid corpus entry with neutral tags
///
/// Every entry built here carries the same tags, so entries only differ by
/// id and title unless a test changes them.
pub fn sample_entry(id: &str, title: &str) -> CorpusEntry {
    CorpusEntry {
        id: id.to_string(),
        slug: normalize(id),
        title: title.to_string(),
        source_path: None,
        source_url: None,
        author: None,
        bpm: None,
        cpm: None,
        key: None,
        instruments: vec!["piano".to_string()],
        techniques: vec!["layering".to_string()],
        moods: vec!["calm".to_string()],
        genres: vec!["electronic".to_string()],
        prompt_seeds: vec!["simple electronic groove".to_string()],
        snippet: "$: s(\"bd sd\")".to_string(),
        aliases: Vec::new(),
        title_tokens: title.split_whitespace().map(str::to_lowercase).collect(),
        path_tokens: Vec::new(),
    }
}

// Tags are genres, moods, techniques and instruments, in that order
fn tagged_entry(id: &str, title: &str, bpm: f64, tags: [&[&str]; 4], snippet: &str) -> CorpusEntry {
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let [genres, moods, techniques, instruments] = tags;
    CorpusEntry {
        bpm: Some(bpm),
        genres: owned(genres),
        moods: owned(moods),
        techniques: owned(techniques),
        instruments: owned(instruments),
        prompt_seeds: vec![format!("{} style track", title.to_lowercase())],
        snippet: snippet.to_string(),
        ..sample_entry(id, title)
    }
}

/// A four-entry corpus that passes every integrity check
pub fn sample_index() -> CorpusIndex {
    CorpusIndex {
        songs: vec![
            tagged_entry(
                "stranger-things",
                "Stranger Things",
                84.0,
                [&["synthwave"], &["brooding", "nostalgic"], &["arpeggio"], &["sawtooth"]],
                "setcpm(21)\n$: note(\"c3 e3 g3 b3 c4 b3 g3 e3\").s(\"sawtooth\").lpf(900)",
            ),
            tagged_entry(
                "acid-techno",
                "Acid Techno",
                130.0,
                [
                    &["techno", "acid"],
                    &["dark", "driving"],
                    &["filter-sweep"],
                    &["sawtooth", "tr909"],
                ],
                "setcpm(32)\n$: s(\"bd*4\").bank(\"tr909\")\n$: note(\"c2 c2 eb2 c2\").s(\"sawtooth\").lpf(sine.range(300, 2000))",
            ),
            tagged_entry(
                "ambient-drift",
                "Ambient Drift",
                70.0,
                [&["ambient"], &["calm", "spacious"], &["long-release"], &["triangle"]],
                "setcpm(17)\n$: note(\"<[c3,g3,e4] [a2,e3,c4]>\").s(\"triangle\").room(0.6).slow(4)",
            ),
            tagged_entry(
                "house-groove",
                "House Groove",
                124.0,
                [&["house"], &["uplifting"], &["swing"], &["tr909"]],
                "setcpm(31)\n$: s(\"bd*4, ~ cp, hh*8\").bank(\"tr909\")",
            ),
        ],
        generated_at: "2024-01-01T00:00:00Z".to_string(),
        version: "1.0".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudialError;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<(), AudialError> =
            Err(AudialError::Config("test error message".to_string()));
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<(), AudialError> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    fn test_sample_index_ids_are_unique() {
        let index = sample_index();
        let ids: std::collections::HashSet<_> = index.songs.iter().map(|s| &s.id).collect();
        assert_eq!(ids.len(), index.len());
        assert_eq!(index.songs[0].slug, "strangerthings");
    }
}
