//! Retrieval ranker
//!
//! Scores every corpus entry against a free-text prompt with additive,
//! per-category weights and returns the best matches plus one stylistically
//! different exemplar. Ranking is deterministic for a fixed corpus.

use crate::dataset::{CorpusEntry, CorpusIndex};
use crate::synonyms::expand_prompt;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;

const EXACT_TITLE: u32 = 10;
const PARTIAL_TITLE: u32 = 8;
const BIGRAM: u32 = 6;
const TITLE_TOKEN: u32 = 5;
const GENRE: u32 = 4;
const MOOD: u32 = 3;
const TECHNIQUE: u32 = 2;
const INSTRUMENT: u32 = 2;
const TEMPO: u32 = 1;
const PROMPT_SEED: u32 = 2;

const TEMPO_WORDS: [&str; 4] = ["slow", "fast", "bpm", "tempo"];
const TEMPO_TOLERANCE: f64 = 10.0;
const EMPTY_PROMPT_POOL: usize = 10;
const MIN_RESULTS: usize = 2;

/// A ranked corpus entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedEntry<'a> {
    pub entry: &'a CorpusEntry,
    pub score: u32,
    /// Why the entry scored, one line per awarded category
    pub reasons: Vec<String>,
}

/// A tokenized prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Lower-cased words longer than one character
    pub words: Vec<String>,
    /// Adjacent word pairs joined by a single space
    pub bigrams: Vec<String>,
    /// Synonym expansion of the raw prompt
    pub expanded: Vec<String>,
}

impl Query {
    /// Tokenizes and expands `prompt`
    pub fn new(prompt: &str) -> Self {
        let (words, bigrams) = tokenize_prompt(prompt);
        Self {
            words,
            bigrams,
            expanded: expand_prompt(prompt),
        }
    }

    fn mentions(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.words.iter().any(|w| *w == tag) || self.expanded.iter().any(|t| *t == tag)
    }
}

/// Splits `prompt` into lower-cased words and adjacent-word bigrams
///
/// Punctuation separates words; single-character words are dropped.
///
/// # Examples
///
/// ```
/// use audial::retrieval::tokenize_prompt;
///
/// let (words, bigrams) = tokenize_prompt("Dark, driving techno!");
/// assert_eq!(words, vec!["dark", "driving", "techno"]);
/// assert_eq!(bigrams, vec!["dark driving", "driving techno"]);
/// ```
pub fn tokenize_prompt(prompt: &str) -> (Vec<String>, Vec<String>) {
    let words: Vec<String> = prompt
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() > 1)
        .map(str::to_string)
        .collect();
    let bigrams = words.windows(2).map(|pair| pair.join(" ")).collect();
    (words, bigrams)
}

/// Lower-cases and strips every non-alphanumeric character
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Scores one entry against a query
///
/// Each category awards at most once. Returns the total and the reasons.
pub fn score_entry(entry: &CorpusEntry, query: &Query) -> (u32, Vec<String>) {
    let mut score = 0;
    let mut reasons = Vec::new();

    let slug = if entry.slug.is_empty() {
        normalize(&entry.id)
    } else {
        normalize(&entry.slug)
    };
    let title = normalize(&entry.title);
    let aliases: Vec<String> = entry
        .aliases
        .iter()
        .map(|a| normalize(a))
        .filter(|a| !a.is_empty())
        .collect();
    let prompt = normalize(&query.words.join(" "));

    if !prompt.is_empty() && (prompt == slug || prompt == title) {
        score += EXACT_TITLE;
        reasons.push("exact title match".to_string());
    } else if !prompt.is_empty()
        && !slug.is_empty()
        && (prompt.contains(&slug) || slug.contains(&prompt))
    {
        score += PARTIAL_TITLE;
        reasons.push("partial title match".to_string());
    }

    let bigram_hit = query.bigrams.iter().find(|bigram| {
        let normalized = normalize(bigram);
        slug.contains(&normalized)
            || title.contains(&normalized)
            || aliases
                .iter()
                .any(|a| a.contains(&normalized) || normalized.contains(a.as_str()))
    });
    if let Some(bigram) = bigram_hit {
        score += BIGRAM;
        reasons.push(format!("bigram match: {}", bigram));
    }

    let word_hit = query.words.iter().find(|word| {
        let normalized = normalize(word);
        !normalized.is_empty()
            && (entry.title_tokens.iter().any(|t| normalize(t) == normalized)
                || entry.path_tokens.iter().any(|t| normalize(t) == normalized)
                || aliases.iter().any(|a| a.contains(&normalized)))
    });
    if let Some(word) = word_hit {
        score += TITLE_TOKEN;
        reasons.push(format!("title token match: {}", word));
    }

    let categories: [(&[String], u32, &str); 4] = [
        (&entry.genres, GENRE, "genre"),
        (&entry.moods, MOOD, "mood"),
        (&entry.techniques, TECHNIQUE, "technique"),
        (&entry.instruments, INSTRUMENT, "instrument"),
    ];
    for (tags, weight, label) in categories {
        if let Some(tag) = tags.iter().find(|tag| query.mentions(tag)) {
            score += weight;
            reasons.push(format!("{}: {}", label, tag));
        }
    }

    if let Some(bpm) = entry.bpm.filter(|bpm| *bpm != 0.0) {
        let tempo_word = query.words.iter().any(|w| TEMPO_WORDS.contains(&w.as_str()));
        let near_bpm = query
            .words
            .iter()
            .filter_map(|w| leading_integer(w))
            .any(|n| (n - bpm).abs() <= TEMPO_TOLERANCE);
        if tempo_word || near_bpm {
            score += TEMPO;
            reasons.push(format!("tempo match: {} bpm", bpm));
        }
    }

    let prompt_words: HashSet<&str> = query.words.iter().map(String::as_str).collect();
    let seed_hit = entry.prompt_seeds.iter().any(|seed| {
        let (seed_words, _) = tokenize_prompt(seed);
        let overlap: HashSet<&str> = seed_words
            .iter()
            .map(String::as_str)
            .filter(|w| prompt_words.contains(w))
            .collect();
        overlap.len() >= 2
    });
    if seed_hit {
        score += PROMPT_SEED;
        reasons.push("prompt seed match".to_string());
    }

    (score, reasons)
}

// Integer prefix of a word, e.g. "120bpm" -> 120
fn leading_integer(word: &str) -> Option<f64> {
    let end = word
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(word.len());
    word[..end].parse::<u64>().ok().map(|n| n as f64)
}

/// Ranks `index` against `prompt`
///
/// Returns the `top_k` best entries (at least one), one diverse exemplar
/// when available, backfilled to two results when the corpus allows, and
/// truncated to `max_total` (at least one). An empty corpus yields an
/// empty list.
///
/// # Examples
///
/// ```
/// use audial::dataset::CorpusIndex;
/// use audial::retrieval::retrieve;
///
/// let empty = CorpusIndex::default();
/// assert!(retrieve(&empty, "dark techno", 3, 4).is_empty());
/// ```
pub fn retrieve<'a>(
    index: &'a CorpusIndex,
    prompt: &str,
    top_k: usize,
    max_total: usize,
) -> Vec<RetrievedEntry<'a>> {
    if index.songs.is_empty() {
        return Vec::new();
    }

    let started = Instant::now();
    let query = Query::new(prompt);
    if query.words.is_empty() {
        let pool: Vec<RetrievedEntry<'a>> = index
            .songs
            .iter()
            .take(EMPTY_PROMPT_POOL)
            .map(|entry| RetrievedEntry {
                entry,
                score: 1,
                reasons: vec!["no prompt terms".to_string()],
            })
            .collect();
        let pick = select_diverse(&[], &pool).or_else(|| pool.into_iter().next());
        tracing::debug!("Prompt has no terms, returning a single exemplar");
        let results: Vec<RetrievedEntry<'a>> = pick.into_iter().collect();
        crate::metrics::record_retrieval(results.len(), started.elapsed());
        return results;
    }

    let mut scored: Vec<RetrievedEntry<'a>> = index
        .songs
        .iter()
        .map(|entry| {
            let (score, reasons) = score_entry(entry, &query);
            RetrievedEntry {
                entry,
                score,
                reasons,
            }
        })
        .collect();
    // Stable: ties keep corpus order
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let mut results: Vec<RetrievedEntry<'a>> =
        scored.iter().take(top_k.max(1)).cloned().collect();

    if let Some(diverse) = select_diverse(&results, &scored) {
        results.push(diverse);
    }

    if results.len() < MIN_RESULTS {
        for candidate in &scored {
            if results.len() >= MIN_RESULTS {
                break;
            }
            if !contains(&results, candidate.entry) {
                results.push(candidate.clone());
            }
        }
    }

    results.truncate(max_total.max(1));

    tracing::debug!(
        prompt,
        results = ?results.iter().map(|r| (&r.entry.id, r.score)).collect::<Vec<_>>(),
        "Retrieved references"
    );
    crate::metrics::record_retrieval(results.len(), started.elapsed());
    results
}

/// Picks the best-scoring entry outside `selected` that brings a genre or
/// mood not already covered by `selected`
fn select_diverse<'a>(
    selected: &[RetrievedEntry<'a>],
    ranked: &[RetrievedEntry<'a>],
) -> Option<RetrievedEntry<'a>> {
    let genres: HashSet<&str> = selected
        .iter()
        .flat_map(|r| r.entry.genres.iter().map(String::as_str))
        .collect();
    let moods: HashSet<&str> = selected
        .iter()
        .flat_map(|r| r.entry.moods.iter().map(String::as_str))
        .collect();

    // max_by_key returns the last maximum; iterate in reverse to keep the first
    ranked
        .iter()
        .rev()
        .filter(|r| !contains(selected, r.entry))
        .filter(|r| {
            r.entry.genres.iter().any(|g| !genres.contains(g.as_str()))
                || r.entry.moods.iter().any(|m| !moods.contains(m.as_str()))
        })
        .max_by_key(|r| r.score)
        .map(|r| {
            let mut pick = r.clone();
            pick.reasons.push("diverse exemplar".to_string());
            pick
        })
}

fn contains(results: &[RetrievedEntry<'_>], entry: &CorpusEntry) -> bool {
    results.iter().any(|r| r.entry.id == entry.id)
}
