use std::fmt;

use serde::{Deserialize, Serialize};

/// Token and username of an authenticated operator.
///
/// They only ever exist as a pair, which is what keeps a [`Session`] from
/// being half set.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub username: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
        }
    }

    /// Both halves must be non-blank to be usable.
    pub fn is_complete(&self) -> bool {
        !self.token.trim().is_empty() && !self.username.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}

/// The operator's authentication state.
///
/// Either anonymous or holding a complete [`Credentials`] pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    credentials: Option<Credentials>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.token.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.username.as_str())
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

/// A session value paired with the generation it was published under.
///
/// The generation increases on every login, logout or invalidation, so a
/// request that captured an older generation knows its session is gone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session: Session,
    pub generation: u64,
}
