//! Generation prompts for the external completion service
//!
//! This module assembles the text sent to a model: a mode-specific
//! instruction block, the pattern-script rules derived from the active
//! validation limits, retrieved reference snippets and optional style hints.
//! No request is made from here.

pub mod edit_prompt;
pub mod new_prompt;

use crate::config::ValidationConfig;
use crate::dataset::{read_snippet, StylePriors};
use crate::retrieval::RetrievedEntry;
use crate::session::GenerationMode;
use std::fmt::Write;
use std::path::PathBuf;

/// A reference exemplar as shown to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub title: String,
    pub tags: Vec<String>,
    pub snippet: String,
}

impl Reference {
    /// Builds a reference from a retrieval result, reading its snippet from
    /// the song collection when available
    pub fn from_retrieved(retrieved: &RetrievedEntry<'_>, collection_dirs: &[PathBuf]) -> Self {
        let entry = retrieved.entry;
        let tags = entry
            .genres
            .iter()
            .chain(&entry.moods)
            .chain(&entry.techniques)
            .cloned()
            .collect();
        Self {
            title: entry.title.clone(),
            tags,
            snippet: read_snippet(entry, collection_dirs),
        }
    }
}

/// Everything a generation prompt is built from
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub mode: GenerationMode,
    pub request: &'a str,
    pub current_code: Option<&'a str>,
    pub references: &'a [Reference],
    pub priors: Option<&'a StylePriors>,
    pub rules: &'a ValidationConfig,
}

/// Builds the full generation prompt
///
/// Edit mode without current code falls back to the new-composition
/// instructions.
///
/// # Examples
///
/// ```
/// use audial::config::ValidationConfig;
/// use audial::prompts::{build_generation_prompt, PromptInput};
/// use audial::session::GenerationMode;
///
/// let rules = ValidationConfig::default();
/// let prompt = build_generation_prompt(&PromptInput {
///     mode: GenerationMode::New,
///     request: "dark techno",
///     current_code: None,
///     references: &[],
///     priors: None,
///     rules: &rules,
/// });
/// assert!(prompt.contains("REQUEST:\ndark techno"));
/// assert!(prompt.contains("setcpm"));
/// ```
pub fn build_generation_prompt(input: &PromptInput<'_>) -> String {
    let current = input.current_code.filter(|code| !code.trim().is_empty());
    let mut prompt = match (input.mode, current) {
        (GenerationMode::Edit, Some(code)) => edit_prompt::generate_edit_prompt(code),
        _ => new_prompt::generate_new_prompt(),
    };

    prompt.push_str("\n\n");
    prompt.push_str(&rules_summary(input.rules));
    prompt.push_str("\n\n");
    prompt.push_str(PATTERN_CRAFT);

    if !input.references.is_empty() {
        prompt.push_str("\n\nREFERENCES (for style, do not copy):");
        for (i, reference) in input.references.iter().enumerate() {
            let _ = write!(prompt, "\n\n[{}] {}", i + 1, reference.title);
            if !reference.tags.is_empty() {
                let _ = write!(prompt, " ({})", reference.tags.join(", "));
            }
            let _ = write!(prompt, "\n```\n{}\n```", reference.snippet.trim_end());
        }
    }

    if let Some(priors) = input.priors {
        let hints = priors.hint_bullets();
        if !hints.is_empty() {
            prompt.push_str("\n\nSTYLE HINTS:");
            for hint in hints {
                let _ = write!(prompt, "\n- {}", hint);
            }
        }
    }

    let _ = write!(prompt, "\n\nREQUEST:\n{}", input.request.trim());
    prompt
}

/// Writing rules the validator cannot check but the model must follow
pub const PATTERN_CRAFT: &str = r#"PATTERN WRITING:
- Never put more than 2 rests in a row: "~ ~" is the limit, "[g4 ~ ~ ~]" is too sparse
- Rests may fill at most half of any pattern
- Do not repeat the same phrase inside a pattern; vary it with transforms
- Comments are short technical labels only ("bass", "pad", "drums", "texture")
- Use single-line strings: note("c4 ~ eb4 g4"), never backtick template strings
- Keep filter values static: no sine or perlin ranges inside .lpf()
- Never use .pitch(), async code or .orbit() routing
- Keep every gain at or below 0.9"#;

/// Pattern-script rules matching the limits the validator enforces
pub fn rules_summary(rules: &ValidationConfig) -> String {
    let mut summary = String::from("OUTPUT RULES:\n- Reply with exactly one fenced code block and nothing else");
    if rules.require_setcpm {
        summary.push_str("\n- The first line must be setcpm(N)");
    }
    let _ = write!(
        summary,
        "\n- Use between 1 and {} voices, each starting with $:",
        rules.max_voices
    );
    let _ = write!(
        summary,
        "\n- Keep the script between {} and {} code lines",
        rules.min_lines, rules.max_lines
    );
    let _ = write!(
        summary,
        "\n- Use at most {} randomness calls (rand, irand, perlin, sometimes, rarely)",
        rules.max_random_usage
    );
    let _ = write!(
        summary,
        "\n- Chain at most {} effects per voice; never more than {} on one line",
        rules.max_effects_per_voice, rules.max_effect_calls_per_line
    );
    let _ = write!(
        summary,
        "\n- Keep delayfeedback at or below {} and room at or below {}",
        rules.max_delay_feedback, rules.max_room
    );
    if rules.reject_localhost {
        summary.push_str("\n- Do not load samples from URLs or localhost");
    }
    summary.push_str("\n- Balance every (), [] and {}, and every <> inside a pattern string");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{NamedCount, StylePriors};
    use crate::test_utils::sample_index;

    fn input<'a>(
        mode: GenerationMode,
        current_code: Option<&'a str>,
        references: &'a [Reference],
        priors: Option<&'a StylePriors>,
        rules: &'a ValidationConfig,
    ) -> PromptInput<'a> {
        PromptInput {
            mode,
            request: "  make it darker ",
            current_code,
            references,
            priors,
            rules,
        }
    }

    #[test]
    fn test_edit_mode_embeds_current_code() {
        let rules = ValidationConfig::default();
        let prompt = build_generation_prompt(&input(
            GenerationMode::Edit,
            Some("setcpm(90)"),
            &[],
            None,
            &rules,
        ));
        assert!(prompt.starts_with("You are in EDIT mode"));
        assert!(prompt.contains("setcpm(90)"));
        assert!(prompt.ends_with("REQUEST:\nmake it darker"));
    }

    #[test]
    fn test_edit_without_code_falls_back_to_new() {
        let rules = ValidationConfig::default();
        let prompt =
            build_generation_prompt(&input(GenerationMode::Edit, Some("  "), &[], None, &rules));
        assert!(prompt.contains("NEW pattern script"));
    }

    #[test]
    fn test_rules_follow_configuration() {
        let rules = ValidationConfig {
            max_voices: 4,
            require_setcpm: false,
            ..Default::default()
        };
        let summary = rules_summary(&rules);
        assert!(summary.contains("between 1 and 4 voices"));
        assert!(!summary.contains("setcpm"));
        assert!(summary.contains("delayfeedback at or below 0.5"));
    }

    #[test]
    fn test_references_and_hints_are_listed() {
        let index = sample_index();
        let retrieved = crate::retrieval::retrieve(&index, "stranger things", 1, 1);
        let references: Vec<Reference> = retrieved
            .iter()
            .map(|r| Reference::from_retrieved(r, &[]))
            .collect();
        let priors = StylePriors {
            most_common_techniques: vec![NamedCount {
                name: "arpeggio".to_string(),
                count: 3,
            }],
            ..Default::default()
        };
        let rules = ValidationConfig::default();

        let prompt = build_generation_prompt(&input(
            GenerationMode::New,
            None,
            &references,
            Some(&priors),
            &rules,
        ));
        assert!(prompt.contains("REFERENCES"));
        assert!(prompt.contains("[1] Stranger Things"));
        assert!(prompt.contains(&references[0].snippet));
        assert!(prompt.contains("STYLE HINTS:\n- Popular techniques: arpeggio"));
    }

    #[test]
    fn test_pattern_craft_in_both_modes() {
        let rules = ValidationConfig::default();
        for (mode, code) in [
            (GenerationMode::New, None),
            (GenerationMode::Edit, Some("setcpm(90)")),
        ] {
            let prompt = build_generation_prompt(&input(mode, code, &[], None, &rules));
            assert!(prompt.contains("more than 2 rests in a row"));
            assert!(prompt.contains("same phrase"));
            let craft = prompt.find("PATTERN WRITING:").unwrap();
            assert!(prompt.find("OUTPUT RULES:").unwrap() < craft);
            assert!(craft < prompt.find("REQUEST:").unwrap());
        }
    }

    #[test]
    fn test_empty_priors_add_no_section() {
        let rules = ValidationConfig::default();
        let priors = StylePriors::default();
        let prompt = build_generation_prompt(&input(
            GenerationMode::New,
            None,
            &[],
            Some(&priors),
            &rules,
        ));
        assert!(!prompt.contains("STYLE HINTS"));
        assert!(!prompt.contains("REFERENCES"));
    }
}
