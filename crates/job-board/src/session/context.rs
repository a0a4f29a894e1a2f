use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Session, SessionToken};
use crate::identity::Role;

/// Session persisted by the command line client between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub api_url: String,
    pub token: SessionToken,
    pub session: Session,
}

/// Explicit client session state: loaded on start, written at login, cleared at logout.
#[derive(Debug)]
pub struct SessionContext {
    path: PathBuf,
    current: Option<StoredSession>,
}

impl SessionContext {
    /// Load the stored session. A missing file means signed out; an unreadable
    /// one is discarded so the next login starts clean.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SessionStoreError> {
        let path = path.into();
        let current = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<StoredSession>(&raw) {
                Ok(stored) => Some(stored),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "discarding unreadable session file");
                    remove_if_present(&path)?;
                    None
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(source) => return Err(SessionStoreError::io(&path, source)),
        };

        Ok(Self { path, current })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Option<&StoredSession> {
        self.current.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref().map(|stored| &stored.session)
    }

    pub fn role(&self) -> Role {
        self.session().map(|session| session.role).unwrap_or(Role::Guest)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn begin(&mut self, stored: StoredSession) -> Result<(), SessionStoreError> {
        let encoded = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.path, encoded).map_err(|source| SessionStoreError::io(&self.path, source))?;
        debug!(path = %self.path.display(), principal = %stored.session.principal, "session stored");
        self.current = Some(stored);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<Option<StoredSession>, SessionStoreError> {
        remove_if_present(&self.path)?;
        Ok(self.current.take())
    }
}

fn remove_if_present(path: &Path) -> Result<(), SessionStoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(SessionStoreError::io(path, source)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("session encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SessionStoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
