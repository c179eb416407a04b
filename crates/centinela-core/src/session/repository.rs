use super::model::Credentials;
use crate::error::Result;

/// Durable storage for the operator's credentials.
///
/// Absence of stored credentials means "logged out".
#[async_trait::async_trait]
pub trait SessionRepository: Send + Sync {
    /// Loads stored credentials.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(credentials))`: a previous login was persisted
    /// - `Ok(None)`: nothing stored
    /// - `Err(_)`: storage exists but could not be read or parsed
    async fn load(&self) -> Result<Option<Credentials>>;

    /// Persists credentials, replacing anything stored before.
    async fn save(&self, credentials: &Credentials) -> Result<()>;

    /// Removes stored credentials. Succeeds when nothing is stored.
    async fn clear(&self) -> Result<()>;
}
