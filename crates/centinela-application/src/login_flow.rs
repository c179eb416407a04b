//! Login, logout and registration as a single-flight use case.

use centinela_core::analysis::RequestState;
use centinela_core::gateway::{Registration, RegistrationReceipt};
use centinela_core::session::{Session, SessionManager};
use std::sync::Arc;
use tokio::sync::watch;

/// How a single-flight operation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome<T> {
    Completed(T),
    /// Display-ready message.
    Failed(String),
    AlreadyInFlight,
    /// The session changed while the call was out; its result was dropped.
    Stale,
}

pub struct LoginFlow {
    sessions: Arc<SessionManager>,
    state: watch::Sender<RequestState<Session>>,
}

impl LoginFlow {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        Self { sessions, state }
    }

    /// Logs in. A second call while one is running is ignored.
    ///
    /// On failure the previous session, if any, stays in place. A logout
    /// issued while the login is out wins: the grant is discarded.
    pub async fn login(&self, username: &str, password: &str) -> FlowOutcome<Session> {
        if !self.begin() {
            return FlowOutcome::AlreadyInFlight;
        }

        match self.sessions.login(username, password).await {
            Ok(session) => {
                self.state
                    .send_modify(|state| *state = RequestState::Succeeded(session.clone()));
                FlowOutcome::Completed(session)
            }
            Err(e) if e.is_session_changed() => {
                tracing::info!("[LoginFlow] Session changed during login, grant discarded");
                self.state.send_modify(|state| *state = RequestState::Idle);
                FlowOutcome::Stale
            }
            Err(e) => {
                let message = e.user_message();
                tracing::info!("[LoginFlow] Login failed: {}", message);
                self.state
                    .send_modify(|state| *state = RequestState::Failed(message.clone()));
                FlowOutcome::Failed(message)
            }
        }
    }

    pub async fn logout(&self) {
        self.sessions.logout().await;
        self.state.send_modify(|state| {
            if !state.is_in_flight() {
                *state = RequestState::Idle;
            }
        });
    }

    /// Creates an account without changing the current session.
    pub async fn register(&self, registration: &Registration) -> Result<RegistrationReceipt, String> {
        self.sessions
            .register(registration)
            .await
            .map_err(|e| e.user_message())
    }

    pub fn state(&self) -> RequestState<Session> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState<Session>> {
        self.state.subscribe()
    }

    fn begin(&self) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_in_flight() {
                false
            } else {
                *state = RequestState::InFlight;
                true
            }
        })
    }
}
