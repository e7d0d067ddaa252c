//! Bounded source previews for retrieved entries

use super::types::CorpusEntry;
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

/// Maximum number of lines kept in a preview
pub const MAX_SNIPPET_LINES: usize = 80;

/// Maximum number of characters kept in a preview
pub const MAX_SNIPPET_CHARS: usize = 1200;

fn fence_patterns() -> &'static (Regex, Regex) {
    static PATTERNS: OnceLock<(Regex, Regex)> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        (
            Regex::new(r"(?m)^```(?:javascript|js|strudel)?\n?").expect("valid fence regex"),
            Regex::new(r"(?m)```$").expect("valid fence regex"),
        )
    })
}

/// Returns a preview of the entry's source code
///
/// The source file is looked up under each of `collection_dirs` in order;
/// when none is readable the indexed `snippet` is returned unchanged.
pub fn read_snippet(entry: &CorpusEntry, collection_dirs: &[PathBuf]) -> String {
    let Some(relative) = entry.source_path.as_deref().filter(|p| is_safe_relative(p)) else {
        return entry.snippet.clone();
    };

    for dir in collection_dirs {
        let path = dir.join(relative);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                tracing::debug!(id = %entry.id, path = %path.display(), "Read snippet from source");
                return extract_snippet(&content);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                tracing::debug!(path = %path.display(), "Skipping unreadable source: {}", e);
            }
        }
    }

    entry.snippet.clone()
}

/// Strips markdown fences and bounds `content` to a short preview
///
/// # Examples
///
/// ```
/// use audial::dataset::extract_snippet;
///
/// let preview = extract_snippet("```js\nsetcpm(120)\n$: s(\"bd\")\n```\n");
/// assert_eq!(preview, "setcpm(120)\n$: s(\"bd\")");
/// ```
pub fn extract_snippet(content: &str) -> String {
    let (open, close) = fence_patterns();
    let cleaned = open.replace_all(content, "");
    let cleaned = close.replace_all(&cleaned, "");

    let mut snippet = cleaned
        .split('\n')
        .take(MAX_SNIPPET_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    if snippet.chars().count() > MAX_SNIPPET_CHARS {
        snippet = snippet.chars().take(MAX_SNIPPET_CHARS).collect();
        if let Some(newline) = snippet.rfind('\n') {
            let position = snippet[..newline].chars().count();
            if position * 5 > MAX_SNIPPET_CHARS * 4 {
                snippet.truncate(newline);
            }
        }
    }

    snippet.trim().to_string()
}

fn is_safe_relative(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_entry, temp_dir};

    #[test]
    fn test_extract_strips_fences() {
        let preview = extract_snippet("```strudel\nsetcpm(90)\n```");
        assert_eq!(preview, "setcpm(90)");
    }

    #[test]
    fn test_extract_keeps_untagged_content() {
        let preview = extract_snippet("  setcpm(90)\n$: s(\"bd\")  \n");
        assert_eq!(preview, "setcpm(90)\n$: s(\"bd\")");
    }

    #[test]
    fn test_extract_limits_lines() {
        let content: String = (0..200).map(|i| format!("l{}\n", i)).collect();
        let preview = extract_snippet(&content);
        assert_eq!(preview.lines().count(), MAX_SNIPPET_LINES);
        assert!(preview.ends_with("l79"));
    }

    #[test]
    fn test_extract_cuts_on_late_newline() {
        // 30 lines of 49 chars + newline = 1500 chars
        let line = "x".repeat(49);
        let content: String = (0..30).map(|_| format!("{}\n", line)).collect();
        let preview = extract_snippet(&content);
        assert!(preview.chars().count() <= MAX_SNIPPET_CHARS);
        assert!(preview.ends_with(&line));
        assert_eq!(preview.chars().count(), 24 * 50 - 1);
    }

    #[test]
    fn test_extract_hard_cut_without_late_newline() {
        let content = format!("short\n{}", "y".repeat(2000));
        let preview = extract_snippet(&content);
        assert_eq!(preview.chars().count(), MAX_SNIPPET_CHARS);
        assert!(preview.starts_with("short\ny"));
    }

    #[test]
    fn test_read_snippet_prefers_source_file() {
        let dir = temp_dir();
        let mut entry = sample_entry("song", "Song");
        entry.source_path = Some("artist/song.js".to_string());
        entry.snippet = "indexed".to_string();

        std::fs::create_dir_all(dir.path().join("artist")).unwrap();
        std::fs::write(dir.path().join("artist/song.js"), "setcpm(100)\n").unwrap();

        let missing = dir.path().join("nope");
        let preview = read_snippet(&entry, &[missing, dir.path().to_path_buf()]);
        assert_eq!(preview, "setcpm(100)");
    }

    #[test]
    fn test_read_snippet_falls_back_to_index() {
        let dir = temp_dir();
        let mut entry = sample_entry("song", "Song");
        entry.source_path = Some("missing.js".to_string());
        entry.snippet = "indexed".to_string();

        assert_eq!(read_snippet(&entry, &[dir.path().to_path_buf()]), "indexed");
    }

    #[test]
    fn test_read_snippet_rejects_parent_paths() {
        let dir = temp_dir();
        let inner = dir.path().join("collection");
        std::fs::create_dir_all(&inner).unwrap();
        std::fs::write(dir.path().join("secret.js"), "secret").unwrap();

        let mut entry = sample_entry("song", "Song");
        entry.source_path = Some("../secret.js".to_string());
        entry.snippet = "indexed".to_string();

        assert_eq!(read_snippet(&entry, &[inner]), "indexed");
    }
}
