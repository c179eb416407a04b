//! Error types for the Centinela client.

use thiserror::Error;

/// Message shown when a login is rejected without a server-provided reason.
pub const DEFAULT_LOGIN_ERROR: &str = "Login failed";

/// Message for calls that need a session when none is held.
pub const NOT_AUTHENTICATED: &str = "Not authenticated";

/// Message for a response that arrived after the session it was sent under
/// had been replaced or cleared.
pub const SESSION_CHANGED: &str = "Session changed; result discarded";

/// Message shown for any failure where no response was received.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to reach the analysis service. Check your connection and try again.";

/// A shared error type for the entire Centinela client.
///
/// The first four variants form the remote-call taxonomy: local validation,
/// authentication, server-reported (operational) failures, and network
/// failures where no response arrived. The remaining variants cover local
/// storage and configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CentinelaError {
    /// Malformed local input. Never sent to the network.
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP 401 or an explicit login rejection.
    #[error(
        "Authentication failed: {}",
        .message.as_deref().unwrap_or("invalid or expired credentials")
    )]
    Authentication { message: Option<String> },

    /// Any other non-2xx response (or an unreadable 2xx body).
    #[error(
        "Server error ({status}): {}",
        .message.as_deref().unwrap_or("no details provided")
    )]
    Operational { status: u16, message: Option<String> },

    /// No response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// The session changed while the request was out; its response was
    /// dropped without being applied.
    #[error("Session changed while a request was in flight")]
    SessionChanged,

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CentinelaError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an Authentication error carrying a server-provided message.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: Some(message.into()),
        }
    }

    pub fn operational(status: u16, message: Option<String>) -> Self {
        Self::Operational { status, message }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    pub fn is_operational(&self) -> bool {
        matches!(self, Self::Operational { .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_session_changed(&self) -> bool {
        matches!(self, Self::SessionChanged)
    }

    /// HTTP status of a server-reported failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::Operational { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The message the server attached to its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Authentication { message } | Self::Operational { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Converts the error into the text shown to the operator.
    ///
    /// Server messages are surfaced verbatim; network failures get a generic
    /// connectivity hint.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Authentication { message } => message
                .clone()
                .unwrap_or_else(|| "Your session has expired. Please log in again.".to_string()),
            Self::Operational { status, message } => message
                .clone()
                .unwrap_or_else(|| format!("The server returned an error (HTTP {status})")),
            Self::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Self::SessionChanged => SESSION_CHANGED.to_string(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CentinelaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CentinelaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CentinelaError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for CentinelaError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CentinelaError>`.
pub type Result<T> = std::result::Result<T, CentinelaError>;
