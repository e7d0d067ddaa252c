//! Extraction of a pattern script from raw model output
//!
//! Model replies arrive as free text. This module pulls out exactly one code
//! candidate (a fenced block, or the whole reply when it is bare code) and
//! applies the minimal structural checks needed before the script is handed
//! to the validator:
//!
//! 1. the reply must not be blank
//! 2. at most one fenced block may be present
//! 3. the candidate must not be blank
//! 4. quoting artifacts (`\"`, `\'`, `` \` ``) are stripped
//! 5. an unfenced reply must look like code at all
//! 6. the first statement must set the tempo with `setcpm`
//! 7. at least one `$:` voice binding must exist
//! 8. parentheses and square brackets must balance
//!
//! The first failing rule wins. Failures are ordinary values of
//! [`ParseFailure`], never panics.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Why a model reply was not accepted as a pattern script
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// Reply was empty after trimming
    #[error("empty response")]
    EmptyResponse,

    /// More than one fenced block was found
    #[error("found {0} code blocks (expected exactly one)")]
    MultipleBlocks(usize),

    /// The (single) candidate contained only whitespace
    #[error("code block is empty")]
    EmptyBlock,

    /// Unfenced reply that reads as prose rather than code
    #[error("no code block found in response")]
    NoCodeBlock,

    /// First statement is not a tempo call
    #[error("code must start with setcpm(N)")]
    MissingSetcpm,

    /// No `$:` voice binding anywhere in the candidate
    #[error("code must contain at least one voice assignment ($:)")]
    MissingVoice,

    /// `(` and `)` counts differ
    #[error("unbalanced parentheses: {open} opening '(' vs {close} closing ')'")]
    UnbalancedParentheses {
        /// Number of `(`
        open: usize,
        /// Number of `)`
        close: usize,
    },

    /// `[` and `]` counts differ
    #[error("unbalanced brackets: {open} opening '[' vs {close} closing ']'")]
    UnbalancedBrackets {
        /// Number of `[`
        open: usize,
        /// Number of `]`
        close: usize,
    },
}

/// Outcome of [`parse_model_output`]: the cleaned code, or the reason it was refused.
pub type ParsedOutput = std::result::Result<String, ParseFailure>;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"```[A-Za-z0-9_+\-]*[ \t]*\r?\n?([\s\S]*?)```").expect("valid fence regex")
    })
}

fn code_marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        // A pattern call must take a quoted argument, and contractions such
        // as "let's (" never count as a call
        Regex::new(
            r#"setcpm\s*\(|\$:|(?:^|[^\w'’])(?:note|n|s|sound|samples?)\s*\(\s*["'`]|(?:^|[^\w'’])stack\s*\(\s*(?:note|n|s|sound)\s*\("#,
        )
        .expect("valid code marker regex")
    })
}

/// Extracts and structurally checks a pattern script from a model reply.
///
/// # Examples
///
/// ```
/// use audial::output_parser::{parse_model_output, ParseFailure};
///
/// let reply = "```javascript\nsetcpm(120)\n$: note(\"c4 e4 g4\").s(\"piano\")\n```";
/// let code = parse_model_output(reply).unwrap();
/// assert!(code.starts_with("setcpm(120)"));
///
/// assert_eq!(parse_model_output("   "), Err(ParseFailure::EmptyResponse));
/// ```
pub fn parse_model_output(raw: &str) -> ParsedOutput {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseFailure::EmptyResponse);
    }

    let blocks: Vec<&str> = fence_regex()
        .captures_iter(trimmed)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    if blocks.len() > 1 {
        return Err(ParseFailure::MultipleBlocks(blocks.len()));
    }

    let fenced = blocks.len() == 1;
    let candidate = blocks.first().copied().unwrap_or(trimmed);

    if candidate.trim().is_empty() {
        return Err(ParseFailure::EmptyBlock);
    }

    let code = strip_escaped_quotes(candidate.trim());

    if !fenced && !code_marker_regex().is_match(&code) {
        tracing::debug!("Rejecting unfenced reply without code markers");
        return Err(ParseFailure::NoCodeBlock);
    }

    let first_statement = code
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("//"));
    if !first_statement.is_some_and(|line| line.starts_with("setcpm")) {
        return Err(ParseFailure::MissingSetcpm);
    }

    if !code.contains("$:") {
        return Err(ParseFailure::MissingVoice);
    }

    let (open, close) = count_pair(&code, '(', ')');
    if open != close {
        return Err(ParseFailure::UnbalancedParentheses { open, close });
    }

    let (open, close) = count_pair(&code, '[', ']');
    if open != close {
        return Err(ParseFailure::UnbalancedBrackets { open, close });
    }

    Ok(code)
}

/// Returns true when two scripts differ only in whitespace.
///
/// Each line is trimmed and blank lines are dropped before comparing, so
/// re-indenting or adding empty lines is not a change. Any token edit is.
///
/// # Examples
///
/// ```
/// use audial::output_parser::is_code_unchanged;
///
/// assert!(is_code_unchanged("setcpm(90)\n$: s(\"bd\")", "  setcpm(90)\n\n  $: s(\"bd\")  "));
/// assert!(!is_code_unchanged("setcpm(90)", "setcpm(91)"));
/// ```
pub fn is_code_unchanged(a: &str, b: &str) -> bool {
    normalize_whitespace(a) == normalize_whitespace(b)
}

fn normalize_whitespace(code: &str) -> String {
    code.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_escaped_quotes(code: &str) -> String {
    code.replace("\\\"", "\"")
        .replace("\\'", "'")
        .replace("\\`", "`")
}

fn count_pair(code: &str, open: char, close: char) -> (usize, usize) {
    code.chars().fold((0, 0), |(o, c), ch| {
        if ch == open {
            (o + 1, c)
        } else if ch == close {
            (o, c + 1)
        } else {
            (o, c)
        }
    })
}
