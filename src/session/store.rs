use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use super::state::SessionState;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("session file is corrupt: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// TOML-backed storage for [`SessionState`].
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

    /// Strict read; a missing file is `Ok(None)`.
    pub fn try_load(&self) -> Result<Option<SessionState>, SessionError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let state: SessionState = toml::from_str(&text)?;
        Ok(Some(state.normalized()))
    }

    /// Load the session, falling back to defaults when the file is missing or corrupt.
    ///
    /// A corrupt file is discarded as a whole; no partial recovery is attempted.
    pub fn load(&self) -> SessionState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => {
                debug!(path = %self.path.display(), "no session file, using defaults");
                SessionState::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
                SessionState::default()
            }
        }
    }

    pub fn try_save(&self, state: &SessionState) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(state)?;
        fs::write(&self.path, text)?;
        Ok(())
    }

    /// Write the session; failures are logged and the in-memory state stays authoritative.
    pub fn save(&self, state: &SessionState) {
        if let Err(e) = self.try_save(state) {
            warn!(path = %self.path.display(), error = %e, "failed to save session");
        }
    }
}
