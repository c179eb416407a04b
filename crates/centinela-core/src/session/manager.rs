use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use super::model::{Credentials, Session, SessionSnapshot};
use super::repository::SessionRepository;
use crate::error::{CentinelaError, DEFAULT_LOGIN_ERROR, Result};
use crate::gateway::{IntegrityGateway, Registration, RegistrationReceipt};

/// Owns the operator's session for the lifetime of the process.
///
/// `SessionManager` is responsible for:
/// - Restoring persisted credentials on startup
/// - Logging in through the gateway and persisting the result
/// - Clearing memory and storage on logout or authentication failure
/// - Publishing every change as a [`SessionSnapshot`]
///
/// It is the only writer of the session. Readers take a snapshot per request.
pub struct SessionManager {
    gateway: Arc<dyn IntegrityGateway>,
    repository: Arc<dyn SessionRepository>,
    state: watch::Sender<SessionSnapshot>,
    /// Bumped by every `logout`, including ones that find no session, so an
    /// in-flight login can tell it was cancelled.
    logouts: AtomicU64,
}

impl SessionManager {
    /// Creates a manager with an anonymous session at generation 0.
    pub fn new(gateway: Arc<dyn IntegrityGateway>, repository: Arc<dyn SessionRepository>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            gateway,
            repository,
            state,
            logouts: AtomicU64::new(0),
        }
    }

    /// Loads previously persisted credentials.
    ///
    /// Missing, incomplete or unreadable storage all yield an anonymous
    /// session; this never fails.
    pub async fn restore(&self) -> Session {
        let session = match self.repository.load().await {
            Ok(Some(credentials)) if credentials.is_complete() => {
                tracing::info!(
                    "[SessionManager] Restored session for '{}'",
                    credentials.username
                );
                Session::authenticated(credentials)
            }
            Ok(Some(_)) => {
                tracing::warn!("[SessionManager] Stored session is incomplete, starting logged out");
                Session::anonymous()
            }
            Ok(None) => {
                tracing::debug!("[SessionManager] No stored session");
                Session::anonymous()
            }
            Err(e) => {
                tracing::warn!(
                    "[SessionManager] Failed to read stored session, starting logged out: {}",
                    e
                );
                Session::anonymous()
            }
        };

        self.publish(session.clone());
        session
    }

    /// Verifies credentials with the service and, on success, persists and
    /// publishes the new session.
    ///
    /// # Errors
    ///
    /// - `Validation` when username or password is blank (nothing is sent)
    /// - `Authentication` carrying the server's message, or
    ///   [`DEFAULT_LOGIN_ERROR`] when it sent none
    /// - `Network` when the service could not be reached
    /// - `SessionChanged` when a logout or another login landed while this
    ///   one was out; the grant is discarded
    ///
    /// On any error the current session is left as it was.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(CentinelaError::validation(
                "Username and password are required",
            ));
        }

        let generation = self.generation();
        let logouts = self.logouts.load(Ordering::SeqCst);
        let grant = self
            .gateway
            .login(username, password)
            .await
            .map_err(into_login_failure)?;

        let credentials = Credentials::new(grant.token, username);
        if !credentials.is_complete() {
            tracing::warn!("[SessionManager] Login response carried an empty token");
            return Err(CentinelaError::authentication(DEFAULT_LOGIN_ERROR));
        }

        let session = Session::authenticated(credentials.clone());
        let published = self.state.send_if_modified(|snapshot| {
            if snapshot.generation != generation
                || self.logouts.load(Ordering::SeqCst) != logouts
            {
                return false;
            }
            snapshot.session = session.clone();
            snapshot.generation += 1;
            true
        });
        if !published {
            tracing::info!("[SessionManager] Session changed during login, discarding grant");
            return Err(CentinelaError::SessionChanged);
        }

        if let Err(e) = self.repository.save(&credentials).await {
            // The session still works for this run; it just won't survive a restart.
            tracing::warn!("[SessionManager] Failed to persist session: {}", e);
        }
        tracing::info!("[SessionManager] Logged in as '{}'", username);

        Ok(session)
    }

    /// Creates an account. The current session is not touched.
    pub async fn register(&self, registration: &Registration) -> Result<RegistrationReceipt> {
        if registration.username.trim().is_empty()
            || registration.password.is_empty()
            || registration.email.trim().is_empty()
        {
            return Err(CentinelaError::validation(
                "Username, password and email are required",
            ));
        }

        let receipt = self.gateway.register(registration).await?;
        tracing::info!(
            "[SessionManager] Registered account '{}'",
            registration.username
        );
        Ok(receipt)
    }

    /// Clears the session in memory and in storage. Safe to call when
    /// already logged out.
    pub async fn logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        let changed = self.state.send_if_modified(|snapshot| {
            if snapshot.session.is_authenticated() {
                snapshot.session = Session::anonymous();
                snapshot.generation += 1;
                true
            } else {
                false
            }
        });

        if let Err(e) = self.repository.clear().await {
            tracing::warn!("[SessionManager] Failed to clear stored session: {}", e);
        }

        if changed {
            tracing::info!("[SessionManager] Logged out");
        }
    }

    /// Drops the session after the service rejected its token.
    pub async fn invalidate(&self, reason: &str) {
        tracing::warn!("[SessionManager] Session invalidated: {}", reason);
        self.logout().await;
    }

    /// The current session.
    pub fn current(&self) -> Session {
        self.state.borrow().session.clone()
    }

    /// The current session together with its generation.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().session.is_authenticated()
    }

    /// Subscribes to session changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    fn publish(&self, session: Session) {
        self.state.send_modify(|snapshot| {
            snapshot.session = session;
            snapshot.generation += 1;
        });
    }
}

/// Maps a gateway failure during login to what the operator sees.
///
/// Server rejections of any status become `Authentication`; local and
/// network failures keep their kind.
fn into_login_failure(err: CentinelaError) -> CentinelaError {
    match err {
        CentinelaError::Authentication { message }
        | CentinelaError::Operational { message, .. } => CentinelaError::Authentication {
            message: Some(message.unwrap_or_else(|| DEFAULT_LOGIN_ERROR.to_string())),
        },
        other => other,
    }
}
