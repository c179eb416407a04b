//! Analysis orchestrator.
//!
//! Drives one analysis at a time from the evidence form to a displayed
//! result: `Idle → InFlight → Succeeded | Failed`, and back to `InFlight`
//! on the next submit.

use centinela_core::analysis::{AnalysisRequest, AnalysisResult, RequestState};
use centinela_core::error::NOT_AUTHENTICATED;
use centinela_core::evidence::EvidenceForm;
use centinela_core::gateway::IntegrityGateway;
use centinela_core::session::SessionManager;
use std::sync::Arc;
use tokio::sync::watch;

/// What the front-end renders for the analysis flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisView {
    pub state: RequestState<AnalysisResult>,
    /// Most recent successful result. Survives later failures until
    /// [`AnalysisOrchestrator::clear_result`].
    pub last_result: Option<AnalysisResult>,
}

/// How a call to [`AnalysisOrchestrator::submit`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Completed(AnalysisResult),
    /// Display-ready message.
    Failed(String),
    /// Another submission was running; nothing was sent.
    AlreadyInFlight,
    /// The session changed while the request was out; the response was
    /// dropped.
    Stale,
}

pub struct AnalysisOrchestrator {
    gateway: Arc<dyn IntegrityGateway>,
    sessions: Arc<SessionManager>,
    view: watch::Sender<AnalysisView>,
}

impl AnalysisOrchestrator {
    pub fn new(gateway: Arc<dyn IntegrityGateway>, sessions: Arc<SessionManager>) -> Self {
        let (view, _) = watch::channel(AnalysisView::default());
        Self {
            gateway,
            sessions,
            view,
        }
    }

    /// Snapshots the form and submits it.
    pub async fn submit(&self, form: &EvidenceForm) -> SubmitOutcome {
        self.submit_request(form.snapshot()).await
    }

    /// Submits an already captured request.
    ///
    /// At most one submission runs at a time; a call made while one is in
    /// flight returns [`SubmitOutcome::AlreadyInFlight`] without touching
    /// the network.
    pub async fn submit_request(&self, request: AnalysisRequest) -> SubmitOutcome {
        let claimed = self.view.send_if_modified(|view| {
            if view.state.is_in_flight() {
                false
            } else {
                view.state = RequestState::InFlight;
                true
            }
        });
        if !claimed {
            tracing::debug!("[Orchestrator] Submit ignored, analysis already in flight");
            return SubmitOutcome::AlreadyInFlight;
        }

        let snapshot = self.sessions.snapshot();
        if !snapshot.session.is_authenticated() {
            return self.fail(NOT_AUTHENTICATED.to_string());
        }

        tracing::info!(
            "[Orchestrator] Submitting analysis ({} / {}, {} evidence flags)",
            request.role,
            request.product_type,
            request.evidence.present_count()
        );
        let response = self.gateway.analyze(&snapshot.session, &request).await;

        if self.sessions.generation() != snapshot.generation {
            tracing::info!("[Orchestrator] Session changed during analysis, dropping response");
            self.view.send_modify(|view| view.state = RequestState::Idle);
            return SubmitOutcome::Stale;
        }

        match response {
            Ok(result) => {
                tracing::info!(
                    "[Orchestrator] Case {} scored {} ({})",
                    result.case_id,
                    result.score,
                    result.risk_level.wire_name()
                );
                self.view.send_modify(|view| {
                    view.state = RequestState::Succeeded(result.clone());
                    view.last_result = Some(result.clone());
                });
                SubmitOutcome::Completed(result)
            }
            Err(e) => {
                if e.is_authentication() {
                    self.sessions.invalidate("analysis rejected the token").await;
                }
                self.fail(e.user_message())
            }
        }
    }

    /// Forgets the last result. A submission in flight is unaffected.
    pub fn clear_result(&self) {
        self.view.send_modify(|view| {
            view.last_result = None;
            if !view.state.is_in_flight() {
                view.state = RequestState::Idle;
            }
        });
    }

    pub fn view(&self) -> AnalysisView {
        self.view.borrow().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.view.borrow().state.is_in_flight()
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalysisView> {
        self.view.subscribe()
    }

    fn fail(&self, message: String) -> SubmitOutcome {
        tracing::warn!("[Orchestrator] Analysis failed: {}", message);
        self.view
            .send_modify(|view| view.state = RequestState::Failed(message.clone()));
        SubmitOutcome::Failed(message)
    }
}
