//! Path resolution for Centinela's local files.
//!
//! Everything lives under the platform config directory resolved by
//! `AppPaths` (XDG on Linux/macOS, the usual location on Windows).

use std::path::PathBuf;
use version_migrate::AppPaths;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for centinela_core::CentinelaError {
    fn from(e: PathError) -> Self {
        centinela_core::CentinelaError::config(e.to_string())
    }
}

/// Well-known locations.
///
/// ```text
/// ~/.config/centinela/
/// ├── config.toml          # API endpoint, timeout, log level
/// ├── session.toml         # Persisted token and username (mode 600)
/// └── logs/
///     └── centinela.log.YYYY-MM-DD
/// ```
pub struct CentinelaPaths;

impl CentinelaPaths {
    fn app_paths() -> AppPaths {
        AppPaths::new("centinela")
    }

    pub fn config_dir() -> Result<PathBuf, PathError> {
        Self::app_paths()
            .config_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Path of the persisted session.
    ///
    /// The file carries a bearer token; it is written with owner-only
    /// permissions on Unix.
    pub fn session_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("session.toml"))
    }

    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }
}
