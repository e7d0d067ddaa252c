//! Editing sessions: current code, version history, chat and archive

pub mod persistence;
pub mod store;
pub mod types;

pub use persistence::{MemoryPersistence, SessionPersistence, SledPersistence, STORAGE_KEY};
pub use store::{Listener, SessionStore, SubscriptionId};
pub use types::{
    ChatMessage, GenerationMode, Role, Session, SessionState, SongVersion, DEFAULT_CODE,
};

use crate::config::SessionConfig;
use crate::error::Result;

/// Opens the sled-backed store at the configured or default location
pub fn open_store(config: &SessionConfig) -> Result<SessionStore> {
    let persistence = match &config.storage_path {
        Some(path) => SledPersistence::open(path)?,
        None => SledPersistence::open_default()?,
    };
    Ok(SessionStore::new(Box::new(persistence), config))
}
