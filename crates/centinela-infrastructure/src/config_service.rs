//! Configuration service.
//!
//! Loads `~/.config/centinela/config.toml`, applies environment overrides and
//! caches the result.

use centinela_core::config::{ClientConfig, DEFAULT_TIMEOUT_SECS};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::paths::CentinelaPaths;
use crate::storage::AtomicTomlFile;

pub const ENV_API_URL: &str = "CENTINELA_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "CENTINELA_TIMEOUT_SECS";

/// Loads and caches [`ClientConfig`].
///
/// A missing or unreadable file yields defaults; the client must always be
/// able to start.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Service reading the config file from the platform config directory.
    pub fn new() -> Self {
        let path = match CentinelaPaths::config_file() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("[ConfigService] {}; using defaults", e);
                None
            }
        };
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Service reading from an explicit path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the configuration, loading it on first access.
    pub fn get_config(&self) -> ClientConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let mut loaded = self.load_file();
        apply_overrides(&mut loaded, |key| std::env::var(key).ok());

        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(loaded.clone());
        loaded
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_file(&self) -> ClientConfig {
        let Some(path) = &self.path else {
            return ClientConfig::default();
        };

        match AtomicTomlFile::<ClientConfig>::new(path.clone()).load() {
            Ok(Some(mut config)) => {
                tracing::debug!("[ConfigService] Loaded {}", path.display());
                if config.api.timeout_secs == 0 {
                    tracing::warn!(
                        "[ConfigService] Ignoring timeout_secs = 0 in {}, using {}",
                        path.display(),
                        DEFAULT_TIMEOUT_SECS
                    );
                    config.api.timeout_secs = DEFAULT_TIMEOUT_SECS;
                }
                config
            }
            Ok(None) => ClientConfig::default(),
            Err(e) => {
                tracing::warn!(
                    "[ConfigService] Ignoring unreadable {}: {}",
                    path.display(),
                    e
                );
                ClientConfig::default()
            }
        }
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies `CENTINELA_*` overrides read through `lookup`.
fn apply_overrides(config: &mut ClientConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        config.api.base_url = url.trim().to_string();
    }

    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => config.api.timeout_secs = secs,
            _ => tracing::warn!(
                "[ConfigService] Ignoring invalid {}='{}'",
                ENV_TIMEOUT_SECS,
                raw
            ),
        }
    }
}
