//! Review and validation commands
//!
//! Both commands return `Ok(false)` for a rejected script so the entrypoint
//! can exit non-zero without treating the rejection as an error.

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::{commit, review_output, Review};
use crate::session::open_store;
use crate::validator::{validate_pattern, ValidationResult};
use colored::Colorize;
use std::path::Path;

/// Reviews a raw model reply, optionally committing it to the session
pub fn run_check(
    config: &Config,
    file: Option<&Path>,
    apply: bool,
    note: Option<&str>,
    json: bool,
) -> Result<bool> {
    let raw = super::read_input(file)?;
    let review = review_output(&raw, &config.validation);
    tracing::debug!(accepted = review.is_accepted(), "Reviewed model reply");

    if json {
        println!("{}", serde_json::to_string_pretty(&review)?);
    } else {
        print_review(&review);
    }

    if apply && review.is_accepted() {
        let store = open_store(&config.session)?;
        if let Some(committed) = commit(&review, &store, note) {
            if !json {
                match committed.version {
                    Some(version) => println!(
                        "{} previous code saved as {}",
                        "Applied:".green().bold(),
                        version.id.cyan()
                    ),
                    None => println!("{} code unchanged", "Applied:".green().bold()),
                }
            }
        }
    }

    Ok(review.is_accepted())
}

/// Validates an already extracted script
pub fn run_validate(config: &Config, file: Option<&Path>, json: bool) -> Result<bool> {
    let code = super::read_input(file)?;
    let result = validate_pattern(&code, &config.validation);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_validation(&result);
    }

    Ok(result.valid)
}

fn print_review(review: &Review) {
    match review {
        Review::Accepted { code, warnings } => {
            println!("{}", "Accepted".green().bold());
            print_list("Warnings", warnings);
            println!();
            println!("{}", code);
        }
        Review::Rejected { stage, issues } => {
            println!("{} at {} stage", "Rejected".red().bold(), stage);
            print_list("Issues", issues);
        }
    }
}

fn print_validation(result: &ValidationResult) {
    if result.valid {
        println!("{}", "Valid".green().bold());
    } else {
        println!("{}", "Invalid".red().bold());
    }
    print_list("Issues", &result.issues);
    print_list("Warnings", &result.warnings);
}

fn print_list(heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}:", heading.bold());
    for item in items {
        println!("  - {}", item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_file, temp_dir};

    const SCRIPT: &str = "setcpm(90)\n$: s(\"bd ~ sd ~\")\n$: s(\"hh*8\").gain(0.3)\n$: note(\"c2 eb2\").s(\"sine\")\n$: note(\"c4 g4\").s(\"triangle\").gain(0.2)\n";

    #[test]
    fn test_run_validate_valid_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "song.js", SCRIPT);
        assert!(run_validate(&Config::default(), Some(&path), false).unwrap());
    }

    #[test]
    fn test_run_validate_rejects_short_script() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "song.js", "setcpm(90)\n$: s(\"bd\")\n");
        assert!(!run_validate(&Config::default(), Some(&path), true).unwrap());
    }

    #[test]
    fn test_run_check_rejects_reply_without_code() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "reply.txt", "Sorry, I can't help with that.");
        assert!(!run_check(&Config::default(), Some(&path), false, None, false).unwrap());
    }

    #[test]
    fn test_run_check_apply_commits_to_session() {
        let dir = temp_dir();
        let reply = format!("```js\n{}```", SCRIPT);
        let path = create_test_file(&dir, "reply.txt", &reply);
        let mut config = Config::default();
        config.session.storage_path = Some(dir.path().join("db"));
        open_store(&config.session)
            .unwrap()
            .start_new_session(Some("setcpm(60)\n$: s(\"bd\")"));

        assert!(run_check(&config, Some(&path), true, Some("first"), false).unwrap());

        let store = open_store(&config.session).unwrap();
        let session = store.current_session().unwrap();
        assert!(session.current_code.starts_with("setcpm(90)"));
        assert_eq!(session.versions.len(), 1);
        assert_eq!(session.versions[0].note.as_deref(), Some("first"));
    }
}
