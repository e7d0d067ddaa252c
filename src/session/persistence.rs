//! Session blob persistence strategies
//!
//! The whole [`SessionState`] is stored as one JSON document under
//! [`STORAGE_KEY`]. Stores never fail a mutation because of persistence;
//! they log the error and keep the in-memory state.

use super::types::SessionState;
use crate::error::{AudialError, Result};
use directories::ProjectDirs;
use sled::Db;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key under which the session blob is stored
pub const STORAGE_KEY: &str = "audial_session_state";

/// Where session state is read from and written to
pub trait SessionPersistence: Send + Sync {
    /// Reads the stored state, `Ok(None)` when nothing was stored yet
    fn load(&self) -> Result<Option<SessionState>>;

    /// Replaces the stored state
    fn save(&self, state: &SessionState) -> Result<()>;
}

/// Session blob in an embedded `sled` key-value database
pub struct SledPersistence {
    db: Db,
}

impl SledPersistence {
    /// Opens or creates the database at `path`
    ///
    /// # Errors
    ///
    /// Returns `AudialError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use audial::session::SledPersistence;
    ///
    /// # fn main() -> audial::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let persistence = SledPersistence::open(dir.path().join("session.db"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AudialError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let db = sled::open(path)
            .map_err(|e| AudialError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db })
    }

    /// Opens the database in the platform data directory
    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }
}

/// Default session database location in the platform data directory
pub fn default_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "audial", "audial")
        .ok_or_else(|| AudialError::Storage("Could not determine data directory".into()))?;
    Ok(dirs.data_dir().join("session.db"))
}

impl SessionPersistence for SledPersistence {
    fn load(&self) -> Result<Option<SessionState>> {
        let Some(bytes) = self
            .db
            .get(STORAGE_KEY)
            .map_err(|e| AudialError::Storage(format!("Get failed: {}", e)))?
        else {
            return Ok(None);
        };
        let state = serde_json::from_slice(&bytes)
            .map_err(|e| AudialError::Storage(format!("Deserialization failed: {}", e)))?;
        Ok(Some(state))
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        let value = serde_json::to_vec(state)
            .map_err(|e| AudialError::Storage(format!("Serialization failed: {}", e)))?;
        self.db
            .insert(STORAGE_KEY, value)
            .map_err(|e| AudialError::Storage(format!("Insert failed: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| AudialError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }
}

/// Session blob held in memory, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    blob: Mutex<Option<String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a raw stored blob, which need not be valid JSON
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }

    /// Current raw blob
    pub fn blob(&self) -> Option<String> {
        self.blob
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl SessionPersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<SessionState>> {
        match self.blob() {
            Some(blob) => Ok(Some(serde_json::from_str(&blob)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        let blob = serde_json::to_string(state)?;
        *self
            .blob
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(blob);
        Ok(())
    }
}
