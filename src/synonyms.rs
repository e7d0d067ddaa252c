//! Prompt synonym expansion
//!
//! A small, fixed dictionary that maps genre words and cultural references to
//! related style terms. The retrieval ranker matches corpus tags against the
//! expanded terms so that "stranger things" can find a synthwave arpeggio
//! even though neither word appears in its tags.

use std::collections::HashSet;

/// Trigger phrase or word, followed by the terms it implies.
pub const SYNONYMS: &[(&str, &[&str])] = &[
    (
        "stranger things",
        &[
            "retro",
            "synthwave",
            "80s",
            "brooding",
            "arpeggio",
            "minor",
            "cinematic",
            "nostalgic",
        ],
    ),
    (
        "blade runner",
        &["noir", "ambient", "cinematic", "pad", "atmospheric", "dark"],
    ),
    (
        "interstellar",
        &["cinematic", "ambient", "epic", "pad", "atmospheric"],
    ),
    (
        "trance",
        &["supersaw", "trancegate", "rave", "euphoric", "uplifting"],
    ),
    (
        "techno",
        &["minimal", "driving", "repetitive", "four-on-the-floor"],
    ),
    (
        "ambient",
        &["pad", "atmospheric", "spacious", "textural", "evolving"],
    ),
    ("house", &["four-on-the-floor", "groove", "disco", "uplifting"]),
    ("dnb", &["jungle", "breakbeat", "fast", "intense", "complex"]),
    ("acid", &["resonant", "filter", "squelchy", "303"]),
    (
        "synthwave",
        &["retro", "80s", "nostalgic", "arpeggio", "minor"],
    ),
    ("lofi", &["chill", "relaxed", "warm", "nostalgic", "hiphop"]),
    ("dark", &["minor", "brooding", "gritty", "intense"]),
    ("euphoric", &["uplifting", "bright", "energetic", "trance"]),
    ("cinematic", &["atmospheric", "epic", "pad", "orchestral"]),
    ("moody", &["brooding", "dark", "minor", "atmospheric"]),
    ("electronic", &["synth", "synthesizer", "digital"]),
];

/// Returns the related terms registered for an exact dictionary key.
pub fn synonyms_for(key: &str) -> Option<&'static [&'static str]> {
    SYNONYMS
        .iter()
        .find(|(trigger, _)| *trigger == key)
        .map(|(_, terms)| *terms)
}

/// Expands a prompt with related terms from [`SYNONYMS`].
///
/// The original prompt is always the first element, unchanged. A dictionary
/// key contributes its terms when it occurs anywhere in the lower-cased
/// prompt, or when it equals one of the prompt's whitespace-separated words.
/// The result contains no duplicates.
///
/// # Examples
///
/// ```
/// use audial::synonyms::expand_prompt;
///
/// let terms = expand_prompt("give me some TRANCE");
/// assert_eq!(terms[0], "give me some TRANCE");
/// assert!(terms.contains(&"supersaw".to_string()));
/// ```
pub fn expand_prompt(prompt: &str) -> Vec<String> {
    let lower = prompt.to_lowercase();
    let mut expanded = vec![prompt.to_string()];

    for (trigger, terms) in SYNONYMS {
        if lower.contains(trigger) {
            expanded.extend(terms.iter().map(|t| t.to_string()));
        }
    }

    for word in lower.split_whitespace() {
        if let Some(terms) = synonyms_for(word) {
            expanded.extend(terms.iter().map(|t| t.to_string()));
        }
    }

    let mut seen = HashSet::new();
    expanded.retain(|term| seen.insert(term.clone()));
    expanded
}
