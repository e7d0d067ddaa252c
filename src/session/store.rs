//! Session store
//!
//! Owns the [`SessionState`] aggregate. Every mutating call updates the
//! in-memory state, persists the whole state and notifies subscribers, in
//! that order, while holding the state lock. Concurrent callers are
//! serialized, so `apply_new_code` compares and appends atomically.

use super::persistence::SessionPersistence;
use super::types::{
    new_id, ChatMessage, GenerationMode, Role, Session, SessionState, SongVersion, DEFAULT_CODE,
};
use crate::config::SessionConfig;
use crate::output_parser::is_code_unchanged;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Callback invoked after every persisted mutation
///
/// Listeners run while the store is locked and must not call back into it.
pub type Listener = Box<dyn Fn(&SessionState) + Send + Sync>;

/// Handle returned by [`SessionStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

/// The session aggregate with persistence and change notification
pub struct SessionStore {
    state: Mutex<SessionState>,
    listeners: Mutex<Listeners>,
    persistence: Box<dyn SessionPersistence>,
    max_previous_sessions: usize,
    default_code: String,
}

impl SessionStore {
    /// Loads state from `persistence` and builds a store
    ///
    /// Unreadable or corrupt stored state is logged and replaced by a fresh
    /// empty state. The loaded mode is always [`GenerationMode::Edit`].
    pub fn new(persistence: Box<dyn SessionPersistence>, config: &SessionConfig) -> Self {
        let mut state = match persistence.load() {
            Ok(Some(state)) => state,
            Ok(None) => SessionState::default(),
            Err(e) => {
                tracing::warn!("Failed to load session state, starting fresh: {}", e);
                SessionState::default()
            }
        };
        state.mode = GenerationMode::Edit;

        Self {
            state: Mutex::new(state),
            listeners: Mutex::new(Listeners::default()),
            persistence,
            max_previous_sessions: config.max_previous_sessions,
            default_code: config
                .default_code
                .clone()
                .unwrap_or_else(|| DEFAULT_CODE.to_string()),
        }
    }

    /// Registers a change listener
    pub fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let mut listeners = lock(&self.listeners);
        let id = SubscriptionId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, listener));
        id
    }

    /// Removes a listener; returns false when it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry, _)| *entry != id);
        listeners.entries.len() != before
    }

    /// Snapshot of the whole state
    pub fn state(&self) -> SessionState {
        lock(&self.state).clone()
    }

    /// Snapshot of the current session, if any
    pub fn current_session(&self) -> Option<Session> {
        lock(&self.state).current_session.clone()
    }

    /// Current generation mode
    pub fn mode(&self) -> GenerationMode {
        lock(&self.state).mode
    }

    /// Archived sessions, newest first
    pub fn previous_sessions(&self) -> Vec<Session> {
        lock(&self.state).previous_sessions.clone()
    }

    /// Starts a fresh session and switches to [`GenerationMode::New`]
    ///
    /// The outgoing session is archived only if it has chat history. The
    /// archive keeps the newest sessions up to the configured cap.
    pub fn start_new_session(&self, initial_code: Option<&str>) -> Session {
        self.mutate(|state| {
            let session = self.archive_and_replace(state, initial_code);
            state.mode = GenerationMode::New;
            (session, true)
        })
    }

    /// Returns the current session, creating one if none exists
    pub fn ensure_session(&self) -> Session {
        self.mutate(|state| {
            let (session, created) = self.ensure_in(state);
            (session.clone(), created)
        })
    }

    /// Appends a user message to the current session
    pub fn append_user_message(&self, text: &str) -> ChatMessage {
        self.append_message(ChatMessage::new(Role::User, text, None))
    }

    /// Appends an assistant message, optionally carrying code
    pub fn append_assistant_message(&self, text: &str, code: Option<String>) -> ChatMessage {
        self.append_message(ChatMessage::new(Role::Assistant, text, code))
    }

    /// Replaces the content and code of the last message if it is an
    /// assistant message
    ///
    /// Returns false, without persisting or notifying, otherwise.
    pub fn update_last_assistant_message(&self, text: &str, code: Option<String>) -> bool {
        self.mutate(|state| {
            let Some(session) = state.current_session.as_mut() else {
                return (false, false);
            };
            match session.chat.last_mut() {
                Some(last) if last.role == Role::Assistant => {
                    last.content = text.to_string();
                    last.code = code;
                    session.touch();
                    (true, true)
                }
                _ => (false, false),
            }
        })
    }

    /// Makes `code` current, versioning the replaced code when it differs
    ///
    /// A version is appended only when the current code is non-empty,
    /// differs from `code` ignoring whitespace and is not the untouched
    /// starter template of a session without versions. The note defaults to
    /// `version N`. The generation mode is never changed here.
    ///
    /// Returns the appended version, if any.
    pub fn apply_new_code(&self, code: &str, note: Option<&str>) -> Option<SongVersion> {
        self.mutate(|state| {
            let (session, _) = self.ensure_in(state);

            let starter = session.versions.is_empty()
                && is_code_unchanged(&session.current_code, &self.default_code);

            let mut appended = None;
            if !starter
                && !session.current_code.trim().is_empty()
                && !is_code_unchanged(&session.current_code, code)
            {
                let version = SongVersion {
                    id: new_id(),
                    created_at: Utc::now(),
                    code: std::mem::take(&mut session.current_code),
                    note: Some(
                        note.map(str::to_string)
                            .unwrap_or_else(|| format!("version {}", session.versions.len() + 1)),
                    ),
                };
                tracing::debug!(version = %version.id, "Archived replaced code");
                crate::metrics::record_version();
                session.versions.push(version.clone());
                appended = Some(version);
            }

            session.current_code = code.to_string();
            session.touch();
            (appended, true)
        })
    }

    /// Replaces the current code without versioning
    pub fn set_current_code(&self, code: &str) {
        self.mutate(|state| {
            let (session, _) = self.ensure_in(state);
            session.current_code = code.to_string();
            session.touch();
            ((), true)
        })
    }

    /// Empties the current session's chat, keeping its code and versions
    ///
    /// Returns false, without persisting or notifying, when there is no
    /// current session.
    pub fn clear_chat(&self) -> bool {
        self.mutate(|state| match state.current_session.as_mut() {
            Some(session) => {
                session.chat.clear();
                session.touch();
                (true, true)
            }
            None => (false, false),
        })
    }

    fn append_message(&self, message: ChatMessage) -> ChatMessage {
        self.mutate(|state| {
            let (session, _) = self.ensure_in(state);
            session.chat.push(message.clone());
            session.touch();
            (message, true)
        })
    }

    // Current session inside an ongoing mutation, created like
    // `start_new_session` when missing; the flag reports creation
    fn ensure_in<'s>(&self, state: &'s mut SessionState) -> (&'s mut Session, bool) {
        let created = state.current_session.is_none();
        if created {
            self.archive_and_replace(state, None);
            state.mode = GenerationMode::New;
        }
        let session = state
            .current_session
            .get_or_insert_with(|| Session::new(self.default_code.clone()));
        (session, created)
    }

    fn archive_and_replace(&self, state: &mut SessionState, initial_code: Option<&str>) -> Session {
        if let Some(outgoing) = state.current_session.take() {
            if !outgoing.chat.is_empty() {
                tracing::debug!(session = %outgoing.session_id, "Archiving session");
                state.previous_sessions.insert(0, outgoing);
                state.previous_sessions.truncate(self.max_previous_sessions);
            }
        }

        let code = initial_code
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.default_code.clone());
        let session = Session::new(code);
        tracing::info!(session = %session.session_id, "Started new session");
        state.current_session = Some(session.clone());
        session
    }

    // Runs `change` under the state lock; when it reports a change the state
    // is persisted and listeners are notified before the lock is released.
    fn mutate<R>(&self, change: impl FnOnce(&mut SessionState) -> (R, bool)) -> R {
        let mut state = lock(&self.state);
        let (result, changed) = change(&mut state);
        if changed {
            if let Err(e) = self.persistence.save(&state) {
                tracing::warn!("Failed to persist session state: {}", e);
            }
            for (_, listener) in &lock(&self.listeners).entries {
                listener(&state);
            }
        }
        result
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
