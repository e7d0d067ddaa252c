//! Review pipeline: parse a model reply, validate the code, commit it
//!
//! Rejections are ordinary outcomes reported as [`Review::Rejected`]; the
//! caller shows the issues and may ask the model again.

use crate::config::ValidationConfig;
use crate::output_parser::parse_model_output;
use crate::session::{ChatMessage, SessionStore, SongVersion};
use crate::validator::validate_pattern;
use serde::Serialize;
use std::fmt;

/// Pipeline stage that refused a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parse,
    Validate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Parse => "parse",
            Stage::Validate => "validate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of reviewing one model reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Review {
    /// The reply holds a valid pattern script
    Accepted { code: String, warnings: Vec<String> },
    /// The reply was refused at `stage`
    Rejected { stage: Stage, issues: Vec<String> },
}

impl Review {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Review::Accepted { .. })
    }
}

/// Result of committing an accepted review to a session
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    /// Version created for the replaced code, if the code changed
    pub version: Option<SongVersion>,
    /// Assistant message recorded in the chat
    pub message: ChatMessage,
}

/// Parses `raw` and validates the extracted code
///
/// # Examples
///
/// ```
/// use audial::config::ValidationConfig;
/// use audial::pipeline::{review_output, Review, Stage};
///
/// let review = review_output("no code here", &ValidationConfig::default());
/// assert!(matches!(review, Review::Rejected { stage: Stage::Parse, .. }));
/// ```
pub fn review_output(raw: &str, config: &ValidationConfig) -> Review {
    let review = review_inner(raw, config);
    crate::metrics::record_review(&review);
    review
}

fn review_inner(raw: &str, config: &ValidationConfig) -> Review {
    let code = match parse_model_output(raw) {
        Ok(code) => code,
        Err(failure) => {
            tracing::debug!("Reply rejected by parser: {}", failure);
            return Review::Rejected {
                stage: Stage::Parse,
                issues: vec![failure.to_string()],
            };
        }
    };

    let result = validate_pattern(&code, config);
    if result.valid {
        Review::Accepted {
            code,
            warnings: result.warnings,
        }
    } else {
        tracing::debug!(issues = result.issues.len(), "Reply rejected by validator");
        Review::Rejected {
            stage: Stage::Validate,
            issues: result.issues,
        }
    }
}

/// Applies an accepted review to `store`
///
/// The code becomes current (versioning the replaced code when it differs)
/// and an assistant message carrying the code is appended. Rejected reviews
/// leave the store untouched and return `None`.
pub fn commit(review: &Review, store: &SessionStore, note: Option<&str>) -> Option<Commit> {
    let Review::Accepted { code, .. } = review else {
        return None;
    };

    let version = store.apply_new_code(code, note);
    let summary = match (&version, note) {
        (Some(_), Some(note)) => format!("Updated code: {}", note),
        (Some(_), None) => "Updated code".to_string(),
        (None, _) => "Code unchanged".to_string(),
    };
    let message = store.append_assistant_message(&summary, Some(code.clone()));

    tracing::info!(
        versioned = version.is_some(),
        "Committed reviewed code to session"
    );
    Some(Commit { version, message })
}
