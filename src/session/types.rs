//! Session aggregate types
//!
//! These types form the persisted session blob. Field names are camelCase in
//! the serialized form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Starter script for a fresh session
pub const DEFAULT_CODE: &str = r#"setcpm(75)

// pad
$: note("<[g3,bb3,d4] [f3,a3,c4] [eb3,g3,bb3] [f3,a3,c4]>")
  .s("sawtooth")
  .lpf(800)
  .gain(0.3)
  .slow(2)
  .room(0.4)

// bass
$: note("g2 ~ f2 ~ eb2 ~ f2 ~").s("sine").lpf(300).gain(0.4).slow(2)

// drums
$: s("bd ~ ~ ~ bd ~ ~ ~").gain(0.25).lpf(200)

// shimmer
$: note("g5 ~ ~ bb5 ~ ~ d6 ~").s("sine").gain(0.2).delay(0.3)
"#;

/// Whether the next generation composes from scratch or edits current code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    New,
    #[default]
    Edit,
}

impl GenerationMode {
    /// Parses a mode name, case-insensitively
    ///
    /// # Examples
    ///
    /// ```
    /// use audial::session::GenerationMode;
    ///
    /// assert_eq!(GenerationMode::parse_str("NEW"), Ok(GenerationMode::New));
    /// assert!(GenerationMode::parse_str("remix").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "edit" => Ok(Self::Edit),
            other => Err(format!("Unknown generation mode: {}", other)),
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationMode::New => write!(f, "new"),
            GenerationMode::Edit => write!(f, "edit"),
        }
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Snapshot of code that was replaced by a newer accepted version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongVersion {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Code attached to an assistant reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ChatMessage {
    pub(crate) fn new(role: Role, content: impl Into<String>, code: Option<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
            code,
        }
    }
}

/// An editing session: current code, prior versions and chat history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub current_code: String,
    /// Prior code, oldest first; never includes `current_code`
    #[serde(default)]
    pub versions: Vec<SongVersion>,
    #[serde(default)]
    pub chat: Vec<ChatMessage>,
}

impl Session {
    /// Creates an empty session holding `code`
    pub fn new(code: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: new_id(),
            created_at: now,
            updated_at: now,
            current_code: code.into(),
            versions: Vec::new(),
            chat: Vec::new(),
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Finds a version by exact id or unique id prefix
    pub fn find_version(&self, id: &str) -> Option<&SongVersion> {
        if let Some(exact) = self.versions.iter().find(|v| v.id == id) {
            return Some(exact);
        }
        let mut matches = self.versions.iter().filter(|v| v.id.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(only), None) if !id.is_empty() => Some(only),
            _ => None,
        }
    }
}

/// The full persisted state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub current_session: Option<Session>,
    #[serde(default)]
    pub mode: GenerationMode,
    /// Archived sessions, newest first
    #[serde(default)]
    pub previous_sessions: Vec<Session>,
}

/// Generates a sortable unique id
pub fn new_id() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_code_is_valid_pattern() {
        let result = crate::validator::validate_pattern(DEFAULT_CODE, &Default::default());
        assert!(result.valid, "{:?}", result.issues);
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new("setcpm(90)");
        assert_eq!(session.session_id.len(), 26);
        assert_eq!(session.created_at, session.updated_at);
        assert!(session.versions.is_empty());
        assert!(session.chat.is_empty());
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let state = SessionState {
            current_session: Some(Session::new("x")),
            mode: GenerationMode::New,
            previous_sessions: Vec::new(),
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"currentSession\""));
        assert!(json.contains("\"currentCode\":\"x\""));
        assert!(json.contains("\"mode\":\"new\""));
        assert!(json.contains("\"previousSessions\""));
    }

    #[test]
    fn test_state_tolerates_missing_fields() {
        let state: SessionState = serde_json::from_str("{}").unwrap();
        assert!(state.current_session.is_none());
        assert_eq!(state.mode, GenerationMode::Edit);
    }

    #[test]
    fn test_find_version_by_prefix() {
        let mut session = Session::new("x");
        for id in ["01AAA", "01ABB", "01BCC"] {
            session.versions.push(SongVersion {
                id: id.to_string(),
                created_at: Utc::now(),
                code: id.to_lowercase(),
                note: None,
            });
        }
        assert_eq!(session.find_version("01B").unwrap().id, "01BCC");
        assert_eq!(session.find_version("01AAA").unwrap().id, "01AAA");
        assert!(session.find_version("01A").is_none());
        assert!(session.find_version("").is_none());
        assert!(session.find_version("zz").is_none());
    }
}
