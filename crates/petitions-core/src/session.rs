//! Signed-in identity and its persistence.
//!
//! A [`Session`] is created by [`SessionStore::login`], read back by later
//! invocations with [`SessionStore::load`], and torn down by
//! [`SessionStore::logout`]. Views receive it explicitly; nothing here is
//! global.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::{Credentials, PetitionApi};
use crate::error::{ApiError, ErrorCode};
use crate::model::user::User;

pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Still being resolved; no decision should be made yet.
    Resolving,
    SignedOut,
    SignedIn(Session),
}

impl SessionState {
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::SignedIn(session) => Some(&session.user),
            Self::Resolving | Self::SignedOut => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session file {path} is unreadable: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("login failed: {0}")]
    Login(#[from] ApiError),
}

impl SessionError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::InternalUnexpected,
            Self::Corrupt { .. } => ErrorCode::SessionCorrupt,
            Self::Login(e) => e.code(),
        }
    }
}

/// File-backed session storage under the client home directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(home: &Path) -> Self {
        Self {
            path: home.join(SESSION_FILE),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| SessionError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    /// Resolve the current [`SessionState`] from disk.
    ///
    /// # Errors
    ///
    /// See [`SessionStore::load`].
    pub fn state(&self) -> Result<SessionState, SessionError> {
        Ok(self
            .load()?
            .map_or(SessionState::SignedOut, SessionState::SignedIn))
    }

    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(session).map_err(|source| {
            SessionError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        write_private(&self.path, &body).map_err(io_err)
    }

    /// Authenticate against the service and persist the resulting session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Login`] if the service rejects the credentials,
    /// or an I/O error if the session cannot be stored.
    pub fn login(
        &self,
        api: &dyn PetitionApi,
        credentials: &Credentials,
    ) -> Result<Session, SessionError> {
        let response = api.login(credentials)?;
        let session = Session {
            token: response.token,
            user: response.user,
        };
        self.save(&session)?;
        tracing::info!(user = %session.user.id, role = %session.user.role, "signed in");
        Ok(session)
    }

    /// Remove the persisted session. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing session file cannot be removed.
    pub fn logout(&self) -> Result<bool, SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("signed out");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SessionError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Write `body` to `path` readable by the owner only. The file holds a
/// bearer token; an existing file is tightened before it is rewritten.
fn write_private(path: &Path, body: &str) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    std::os::unix::fs::OpenOptionsExt::mode(&mut options, 0o600);
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(body.as_bytes())
}
