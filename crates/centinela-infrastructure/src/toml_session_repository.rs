//! TOML-backed `SessionRepository`.

use async_trait::async_trait;
use centinela_core::error::Result;
use centinela_core::session::{Credentials, SessionRepository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::paths::CentinelaPaths;
use crate::storage::AtomicTomlFile;

/// On-disk shape of `session.toml`.
///
/// Missing fields deserialize as empty strings so a hand-edited or
/// truncated file surfaces as incomplete credentials rather than a parse
/// error.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    #[serde(default)]
    token: String,
    #[serde(default)]
    username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
}

impl From<&Credentials> for StoredSession {
    fn from(credentials: &Credentials) -> Self {
        Self {
            token: credentials.token.clone(),
            username: credentials.username.clone(),
            saved_at: Some(Utc::now()),
        }
    }
}

impl From<StoredSession> for Credentials {
    fn from(stored: StoredSession) -> Self {
        Credentials::new(stored.token, stored.username)
    }
}

/// Persists the operator's credentials to a single owner-only TOML file.
pub struct TomlSessionRepository {
    file: AtomicTomlFile<StoredSession>,
}

impl TomlSessionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::private(path),
        }
    }

    /// Repository at `~/.config/centinela/session.toml`.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(CentinelaPaths::session_file()?))
    }
}

#[async_trait]
impl SessionRepository for TomlSessionRepository {
    async fn load(&self) -> Result<Option<Credentials>> {
        let stored = self.file.load()?;
        if let Some(saved_at) = stored.as_ref().and_then(|s| s.saved_at) {
            tracing::debug!("[TomlSessionRepository] Session saved at {}", saved_at);
        }
        Ok(stored.map(Credentials::from))
    }

    async fn save(&self, credentials: &Credentials) -> Result<()> {
        self.file.save(&StoredSession::from(credentials))?;
        tracing::debug!(
            "[TomlSessionRepository] Saved session to {}",
            self.file.path().display()
        );
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.file.remove()?;
        Ok(())
    }
}
