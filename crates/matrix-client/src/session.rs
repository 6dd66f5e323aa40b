//! Client-held session: the bearer token plus the username it belongs to.
//!
//! [`SessionContext`] is the single in-memory source of truth. It is read
//! from disk once at start-up and only changes on auth transitions
//! (`establish` after login/registration, `clear` on logout), writing
//! through to the [`SessionStore`] each time.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

/// JSON file holding both session fields. They are always written and
/// removed together.
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

    /// `None` when no session is stored or the stored token is empty.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: Session = serde_json::from_str(&raw)?;
        if session.token.is_empty() {
            return Ok(None);
        }
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        // Write-then-rename so a crash never leaves half a session behind.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(session)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Shared handle to the current session, passed to every screen.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Option<SessionStore>,
    current: RwLock<Option<Session>>,
}

impl SessionContext {
    /// Read the stored session once. An unreadable file starts signed out.
    pub fn load(store: SessionStore) -> Self {
        let current = match store.load() {
            Ok(session) => session,
            Err(e) => {
                warn!("Ignoring session at {}: {}", store.path().display(), e);
                None
            }
        };

        if let Some(session) = &current {
            debug!("Restored session for {}", session.username);
        }

        Self {
            inner: Arc::new(SessionInner {
                store: Some(store),
                current: RwLock::new(current),
            }),
        }
    }

    /// A context that never touches disk.
    pub fn in_memory(initial: Option<Session>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                store: None,
                current: RwLock::new(initial),
            }),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn username(&self) -> Option<String> {
        self.current().map(|s| s.username)
    }

    /// Presence check only; the server decides whether the token is valid.
    pub fn is_signed_in(&self) -> bool {
        self.current().is_some()
    }

    /// Persist `session`, then make it current. On a write failure nothing
    /// changes.
    pub fn establish(&self, session: Session) -> Result<(), SessionError> {
        if let Some(store) = &self.inner.store {
            store.save(&session)?;
        }
        debug!("Session established for {}", session.username);
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    /// Drop the session. Memory is always cleared; the error reports a file
    /// that could not be removed.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match &self.inner.store {
            Some(store) => store.clear(),
            None => Ok(()),
        }
    }
}
