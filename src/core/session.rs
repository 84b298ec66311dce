//! # Saved Login
//!
//! Keeps the session token between runs so the user isn't asked for a
//! password every time.
//!
//! The token lives in a single JSON file (`~/.termchat/session.json` by
//! default). Writes use atomic rename (write `.tmp`, then `rename()`) for
//! crash safety.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::messaging::{AuthSession, SessionToken};

/// What gets written to disk.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SavedSession {
    pub token: String,
    pub user_id: String,
    pub saved_at: DateTime<Utc>,
}

impl SavedSession {
    pub fn token(&self) -> SessionToken {
        SessionToken(self.token.clone())
    }
}

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "session file I/O error: {e}"),
            StoreError::Parse(e) => write!(f, "session file is corrupt: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<SavedSession>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let saved: SavedSession = serde_json::from_str(&json).map_err(StoreError::Parse)?;
        debug!("Loaded saved session for user {}", saved.user_id);
        Ok(Some(saved))
    }

    pub fn save(&self, session: &AuthSession) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let saved = SavedSession {
            token: session.token.as_str().to_string(),
            user_id: session.user_id.clone(),
            saved_at: Utc::now(),
        };
        atomic_write_json(&self.path, &saved)?;
        info!("Saved session to {}", self.path.display());
        Ok(())
    }

    /// Forget the saved token. Missing file is not an error.
    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed saved session {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
