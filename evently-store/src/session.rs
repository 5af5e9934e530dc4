//! Persisted client session: one bearer token per role plus the theme flag.
//!
//! [`Session`] is the only place tokens live. It is handed to the API client
//! at construction; UI-side code only reads from it. Writes come from
//! login/logout and from the client's 401/403 interceptor.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use evently_core::Role;
use evently_shared::Masked;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl std::str::FromStr for Theme {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(SessionError::InvalidTheme(other.to_string())),
        }
    }
}

/// Everything the portal keeps between runs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    #[serde(default)]
    pub tokens: BTreeMap<Role, Masked<String>>,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Unknown theme: {0}")]
    InvalidTheme(String),
}

/// Where session state is persisted
pub trait SessionBackend: Send + Sync {
    fn load(&self) -> Result<SessionState, SessionError>;
    fn save(&self, state: &SessionState) -> Result<(), SessionError>;
}

/// Keeps nothing across runs
pub struct MemoryBackend;

impl SessionBackend for MemoryBackend {
    fn load(&self) -> Result<SessionState, SessionError> {
        Ok(SessionState::default())
    }

    fn save(&self, _state: &SessionState) -> Result<(), SessionError> {
        Ok(())
    }
}

/// JSON file on disk, written atomically through a sibling temp file
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionBackend for FileBackend {
    fn load(&self) -> Result<SessionState, SessionError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionState::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Shared handle to the session. Cloning shares the same state.
#[derive(Clone)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
    backend: Arc<dyn SessionBackend>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("state", &self.snapshot()).finish()
    }
}

impl Session {
    /// Load state from `backend`
    pub fn open(backend: Arc<dyn SessionBackend>) -> Result<Self, SessionError> {
        let state = backend.load()?;
        tracing::debug!(roles = state.tokens.len(), "Session loaded");
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            backend,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            backend: Arc::new(MemoryBackend),
        }
    }

    pub fn token(&self, role: Role) -> Option<Masked<String>> {
        self.read(|s| s.tokens.get(&role).cloned())
    }

    pub fn is_logged_in(&self, role: Role) -> bool {
        self.read(|s| s.tokens.contains_key(&role))
    }

    pub fn set_token(&self, role: Role, token: impl Into<String>) -> Result<(), SessionError> {
        let token = Masked::new(token.into());
        self.write(|s| {
            s.tokens.insert(role, token);
        })?;
        tracing::info!(%role, "Session token stored");
        Ok(())
    }

    /// Log out one role
    pub fn clear_role(&self, role: Role) -> Result<(), SessionError> {
        self.write(|s| {
            s.tokens.remove(&role);
        })
    }

    /// Drop every role token. The theme flag survives. Memory is cleared
    /// even when persisting fails; the error is still returned.
    pub fn clear_all(&self) -> Result<(), SessionError> {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        guard.tokens.clear();
        tracing::info!("All session tokens cleared");
        self.backend.save(&*guard)
    }

    pub fn theme(&self) -> Theme {
        self.read(|s| s.theme)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), SessionError> {
        self.write(|s| s.theme = theme)
    }

    pub fn snapshot(&self) -> SessionState {
        self.read(|s| s.clone())
    }

    fn read<T>(&self, f: impl FnOnce(&SessionState) -> T) -> T {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&*guard)
    }

    /// Persist first; memory only changes once the backend accepted it
    fn write(&self, f: impl FnOnce(&mut SessionState)) -> Result<(), SessionError> {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.clone();
        f(&mut next);
        self.backend.save(&next)?;
        *guard = next;
        Ok(())
    }
}
