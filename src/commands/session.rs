use crate::cli::SessionCommand;
use crate::config::Config;
use crate::error::{AudialError, Result};
use crate::session::{open_store, Session, SessionStore};
use colored::Colorize;
use prettytable::{format, Table};
use similar::TextDiff;
use std::path::Path;

/// Handle session commands
pub fn handle_session(config: &Config, command: SessionCommand) -> Result<()> {
    let store = open_store(&config.session)?;

    match command {
        SessionCommand::Show => show(&store),
        SessionCommand::New { code } => new_session(&store, code.as_deref()),
        SessionCommand::History => history(&store),
        SessionCommand::Diff { version } => diff(&store, version.as_deref()),
        SessionCommand::Archive => archive(&store),
        SessionCommand::Clear => {
            if store.clear_chat() {
                println!("{}", "Chat cleared.".green());
            } else {
                println!("{}", "No current session.".yellow());
            }
            Ok(())
        }
        SessionCommand::Say { text } => {
            store.append_user_message(&text);
            println!("{}", "Message recorded.".green());
            Ok(())
        }
    }
}

fn show(store: &SessionStore) -> Result<()> {
    let Some(session) = store.current_session() else {
        println!("{}", "No current session.".yellow());
        println!("Use {} to start one.", "audial session new".cyan());
        return Ok(());
    };

    println!("{} {}", "Session:".bold(), session.session_id.cyan());
    println!("{} {}", "Mode:".bold(), store.mode());
    println!(
        "{} {}",
        "Updated:".bold(),
        session.updated_at.format("%Y-%m-%d %H:%M")
    );
    println!(
        "{} {} versions, {} messages",
        "History:".bold(),
        session.versions.len(),
        session.chat.len()
    );
    println!();
    println!("{}", session.current_code);
    Ok(())
}

fn new_session(store: &SessionStore, code_file: Option<&Path>) -> Result<()> {
    let code = match code_file {
        Some(path) => Some(std::fs::read_to_string(path).map_err(|e| {
            AudialError::Session(format!("Failed to read {}: {}", path.display(), e))
        })?),
        None => None,
    };
    let session = store.start_new_session(code.as_deref());
    println!(
        "{}",
        format!("Started session {}", session.session_id).green()
    );
    Ok(())
}

fn history(store: &SessionStore) -> Result<()> {
    let versions = store
        .current_session()
        .map(|s| s.versions)
        .unwrap_or_default();

    if versions.is_empty() {
        println!("{}", "No versions found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "ID".bold(),
        "Created".bold(),
        "Lines".bold(),
        "Note".bold()
    ]);

    for version in versions.iter().rev() {
        table.add_row(prettytable::row![
            version.id.cyan(),
            version.created_at.format("%Y-%m-%d %H:%M").to_string(),
            version.code.lines().count(),
            version.note.as_deref().unwrap_or("-")
        ]);
    }

    println!("\nVersions (newest first):");
    table.printstd();
    println!();
    println!(
        "Use {} to compare with the current code.",
        "audial session diff <ID>".cyan()
    );
    Ok(())
}

fn diff(store: &SessionStore, version: Option<&str>) -> Result<()> {
    let Some(session) = store.current_session() else {
        println!("{}", "No current session.".yellow());
        return Ok(());
    };

    let target = match version {
        Some(id) => session.find_version(id),
        None => session.versions.last(),
    };
    let Some(target) = target else {
        match version.and_then(|id| suggest_version(&session, id)) {
            Some(suggestion) => {
                return Err(AudialError::Session(format!(
                    "Version not found. Did you mean {}?",
                    suggestion
                ))
                .into())
            }
            None if version.is_some() => {
                return Err(AudialError::Session("Version not found".to_string()).into())
            }
            None => {
                println!("{}", "No versions found.".yellow());
                return Ok(());
            }
        }
    };

    let rendered = render_diff(&target.code, &session.current_code, &target.id);
    if rendered.is_empty() {
        println!("{}", "No differences.".yellow());
        return Ok(());
    }
    for line in rendered.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{}", line);
        }
    }
    Ok(())
}

fn archive(store: &SessionStore) -> Result<()> {
    let sessions = store.previous_sessions();

    if sessions.is_empty() {
        println!("{}", "No archived sessions found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "ID".bold(),
        "Created".bold(),
        "Messages".bold(),
        "Versions".bold(),
        "First Message".bold()
    ]);

    for session in sessions {
        let first = session
            .chat
            .first()
            .map(|m| super::truncate_chars(&m.content, 40))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(prettytable::row![
            session.session_id.cyan(),
            session.created_at.format("%Y-%m-%d %H:%M").to_string(),
            session.chat.len(),
            session.versions.len(),
            first
        ]);
    }

    println!("\nArchived Sessions:");
    table.printstd();
    println!();
    Ok(())
}

/// Unified diff from a stored version to the current code
///
/// Returns an empty string when the texts are identical.
pub fn render_diff(old: &str, new: &str, version_id: &str) -> String {
    if old == new {
        return String::new();
    }
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(version_id, "current")
        .to_string()
}

/// Closest stored version id to a mistyped one
///
/// Compares `id` against the equally long prefix of each version id and
/// suggests the nearest when it is at most two edits away.
pub fn suggest_version(session: &Session, id: &str) -> Option<String> {
    let width = id.chars().count();
    session
        .versions
        .iter()
        .map(|version| {
            let prefix: String = version.id.chars().take(width).collect();
            (strsim::levenshtein(&prefix, id), &version.id)
        })
        .filter(|(distance, _)| *distance <= 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, version_id)| version_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SongVersion;
    use chrono::Utc;

    fn session_with_versions(ids: &[&str]) -> Session {
        let mut session = Session::new("setcpm(90)");
        for id in ids {
            session.versions.push(SongVersion {
                id: id.to_string(),
                created_at: Utc::now(),
                code: "setcpm(80)".to_string(),
                note: None,
            });
        }
        session
    }

    #[test]
    fn test_render_diff_marks_changes() {
        let diff = render_diff("setcpm(80)\n$: s(\"bd\")\n", "setcpm(90)\n$: s(\"bd\")\n", "01ABC");
        assert!(diff.contains("--- 01ABC"));
        assert!(diff.contains("+++ current"));
        assert!(diff.contains("-setcpm(80)"));
        assert!(diff.contains("+setcpm(90)"));
    }

    #[test]
    fn test_render_diff_identical_is_empty() {
        assert!(render_diff("a\n", "a\n", "v").is_empty());
    }

    #[test]
    fn test_suggest_version_close_prefix() {
        let session = session_with_versions(&["01HZXK7Q", "01J0AB12"]);
        assert_eq!(
            suggest_version(&session, "01HZXQ"),
            Some("01HZXK7Q".to_string())
        );
    }

    #[test]
    fn test_suggest_version_nothing_close() {
        let session = session_with_versions(&["01HZXK7Q"]);
        assert_eq!(suggest_version(&session, "ZZZZZZZZ"), None);
    }
}
