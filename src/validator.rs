//! Static safety and musicality checks for pattern scripts
//!
//! Generated scripts are checked with a fixed battery of text-level rules
//! before they reach the editing session. The checks guard against chaotic
//! or broken compositions: too many voices, runaway randomness, external
//! sample sources, extreme feedback/reverb and unbalanced delimiters.
//!
//! Every rule runs on every call and all issues are collected in a fixed
//! order, so the same script always yields the same report.

use crate::config::ValidationConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Effect methods counted towards per-voice effect density
pub const EFFECT_METHODS: &[&str] = &[
    "lpf",
    "hpf",
    "delay",
    "delaytime",
    "delayfeedback",
    "room",
    "size",
    "crush",
    "coarse",
    "shape",
    "vowel",
];

/// Outcome of [`validate_pattern`]
///
/// `issues` is empty exactly when `valid` is true. `warnings` are advisory and
/// never affect `valid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the script passed every check
    pub valid: bool,
    /// Human-readable failures, in detection order
    pub issues: Vec<String>,
    /// Advisory notes that do not block acceptance
    #[serde(default)]
    pub warnings: Vec<String>,
}

struct Patterns {
    setcpm: Regex,
    remote_samples: Regex,
    localhost_samples: Regex,
    await_samples: Regex,
    random_calls: Regex,
    perlin: Regex,
    probabilistic: Regex,
    delay_feedback: Regex,
    room: Regex,
    effect_call: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let effect_alternation = EFFECT_METHODS
            .iter()
            .map(|m| regex::escape(m))
            .collect::<Vec<_>>()
            .join("|");
        Patterns {
            setcpm: Regex::new(r"(?i)setcpm\s*\(").expect("valid regex"),
            remote_samples: Regex::new(r#"(?i)samples?\s*\(\s*['"`]https?://"#)
                .expect("valid regex"),
            localhost_samples: Regex::new(r#"(?i)samples?\s*\(\s*['"`][^'"`]*localhost"#)
                .expect("valid regex"),
            await_samples: Regex::new(r"(?i)await\s+samples?\s*\(").expect("valid regex"),
            random_calls: Regex::new(r"\b(?:rand|irand)\s*\(").expect("valid regex"),
            perlin: Regex::new(r"\bperlin\b").expect("valid regex"),
            probabilistic: Regex::new(
                r"\.(?:sometimesBy|sometimes|rarely|almostNever|almostAlways)\s*\(",
            )
            .expect("valid regex"),
            delay_feedback: Regex::new(r"\.delayfeedback\s*\(\s*(\d*\.?\d+)")
                .expect("valid regex"),
            room: Regex::new(r"\.room\s*\(\s*(\d*\.?\d+)").expect("valid regex"),
            effect_call: Regex::new(&format!(r"\.(?:{})\b", effect_alternation))
                .expect("valid regex"),
        }
    })
}

/// Validates a pattern script against `config`.
///
/// Pure and deterministic: no I/O, and identical inputs give identical results.
///
/// # Examples
///
/// ```
/// use audial::config::ValidationConfig;
/// use audial::validator::validate_pattern;
///
/// let code = "setcpm(120)\n$: note(\"c4 e4\").s(\"piano\")\n$: s(\"bd sd\")\n$: s(\"hh*8\")\n$: note(\"c2\").s(\"sine\")";
/// let result = validate_pattern(code, &ValidationConfig::default());
/// assert!(result.valid);
/// assert!(result.issues.is_empty());
/// ```
pub fn validate_pattern(code: &str, config: &ValidationConfig) -> ValidationResult {
    let mut issues = Vec::new();

    let voices = count_voices(code);
    if voices > config.max_voices {
        issues.push(format!(
            "too many voices ({}/{} max) - simplify to fewer tracks",
            voices, config.max_voices
        ));
    }

    let lines = count_code_lines(code);
    if lines > config.max_lines {
        issues.push(format!(
            "code too long ({}/{} lines max) - simplify",
            lines, config.max_lines
        ));
    }
    if lines < config.min_lines {
        issues.push("code too short - add more content".to_string());
    }

    if config.require_setcpm && !patterns().setcpm.is_match(code) {
        issues.push("missing setcpm() - set tempo at the start".to_string());
    }

    if config.reject_localhost && has_forbidden_samples(code) {
        issues.push("uses external/localhost samples - only use built-in samples".to_string());
    }

    let randomness = count_random_usage(code);
    if randomness > config.max_random_usage {
        issues.push(format!(
            "excessive randomness ({}/{} max) - reduce rand/perlin usage",
            randomness, config.max_random_usage
        ));
    }

    if has_extreme_effects(code, config) {
        issues.push("extreme effect values detected - reduce delay feedback and reverb".to_string());
    }

    issues.extend(structural_issues(code));

    if has_dense_voice_line(code, config.max_effect_calls_per_line) {
        issues.push("too many effects on a single voice - simplify effect chains".to_string());
    }

    let warnings = effect_chain_warnings(code, config);

    if !issues.is_empty() {
        tracing::debug!(issue_count = issues.len(), "Pattern script failed validation");
    }

    ValidationResult {
        valid: issues.is_empty(),
        issues,
        warnings,
    }
}

/// Number of `$:` voice bindings in the script
pub fn count_voices(code: &str) -> usize {
    code.matches("$:").count()
}

/// Number of lines that are neither blank nor `//` comments
pub fn count_code_lines(code: &str) -> usize {
    code.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .count()
}

fn has_forbidden_samples(code: &str) -> bool {
    let p = patterns();
    p.remote_samples.is_match(code)
        || p.localhost_samples.is_match(code)
        || p.await_samples.is_match(code)
}

fn count_random_usage(code: &str) -> usize {
    let p = patterns();
    p.random_calls.find_iter(code).count()
        + p.perlin.find_iter(code).count()
        + p.probabilistic.find_iter(code).count()
}

fn has_extreme_effects(code: &str, config: &ValidationConfig) -> bool {
    let exceeds = |re: &Regex, limit: f64| {
        re.captures_iter(code)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
            .any(|value| value > limit)
    };
    let p = patterns();
    exceeds(&p.delay_feedback, config.max_delay_feedback) || exceeds(&p.room, config.max_room)
}

fn structural_issues(code: &str) -> Vec<String> {
    let mut issues = Vec::new();

    for (open, close, name) in [
        ('(', ')', "parentheses"),
        ('[', ']', "brackets"),
        ('{', '}', "braces"),
    ] {
        let opened = code.chars().filter(|&c| c == open).count();
        let closed = code.chars().filter(|&c| c == close).count();
        if opened != closed {
            issues.push(format!(
                "unbalanced {}: {} opening '{}' vs {} closing '{}'",
                name, opened, open, closed, close
            ));
        }
    }

    // Angle brackets only mean alternation inside pattern strings; outside
    // them they are comparisons or arrow functions.
    for literal in string_literals(code) {
        let opened = literal.matches('<').count();
        let closed = literal.matches('>').count();
        if opened != closed {
            issues.push(format!(
                "unbalanced mini-notation: {} opening '<' vs {} closing '>' in pattern",
                opened, closed
            ));
            break;
        }
    }

    issues
}

/// Extracts the contents of every string literal in the script.
///
/// Tracks `"`, `'` and backtick quoting with backslash escapes, and skips
/// `//` line comments so apostrophes in comments do not open a literal.
/// Single and double quoted literals end at a newline if left unterminated;
/// backtick literals may span lines.
pub fn string_literals(code: &str) -> Vec<String> {
    let mut literals = Vec::new();
    let mut chars = code.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '"' | '\'' | '`' => {
                let quote = ch;
                let mut content = String::new();
                while let Some(c) = chars.next() {
                    if c == '\\' {
                        if let Some(escaped) = chars.next() {
                            content.push(escaped);
                        }
                        continue;
                    }
                    if c == quote || (c == '\n' && quote != '`') {
                        break;
                    }
                    content.push(c);
                }
                literals.push(content);
            }
            _ => {}
        }
    }

    literals
}

fn has_dense_voice_line(code: &str, limit: usize) -> bool {
    code.lines()
        .filter(|line| line.contains("$:"))
        .any(|line| patterns().effect_call.find_iter(line).count() > limit)
}

/// Warns about voice chains (a `$:` line plus its `.method()` continuation
/// lines) that use more effects than recommended but stay under the hard
/// per-line limit.
fn effect_chain_warnings(code: &str, config: &ValidationConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut current: Option<(usize, usize)> = None;

    let flush = |chain: Option<(usize, usize)>, warnings: &mut Vec<String>| {
        if let Some((line_no, effects)) = chain {
            if effects > config.max_effects_per_voice {
                warnings.push(format!(
                    "voice on line {} chains {} effects ({} recommended)",
                    line_no, effects, config.max_effects_per_voice
                ));
            }
        }
    };

    for (idx, line) in code.lines().enumerate() {
        let trimmed = line.trim_start();
        let effects = patterns().effect_call.find_iter(line).count();
        if line.contains("$:") {
            flush(current.take(), &mut warnings);
            current = Some((idx + 1, effects));
        } else if trimmed.starts_with('.') {
            if let Some((_, count)) = current.as_mut() {
                *count += effects;
            }
        } else if !trimmed.is_empty() && !trimmed.starts_with("//") {
            flush(current.take(), &mut warnings);
        }
    }
    flush(current, &mut warnings);

    warnings
}
