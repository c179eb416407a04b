//! In-memory doubles shared by the use case tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use centinela_core::analysis::{AnalysisRequest, AnalysisResult, RiskLevel};
use centinela_core::error::{CentinelaError, Result};
use centinela_core::gateway::{IntegrityGateway, LoginGrant, Registration, RegistrationReceipt};
use centinela_core::report::{
    BatchItem, BatchReport, CaseList, CaseQuery, CaseRecord, HealthStatus, InstitutionalMetrics,
    MetricsPeriod, ServiceInfo, TemporalMetrics,
};
use centinela_core::session::{Credentials, Session, SessionManager, SessionRepository};
use tokio::sync::Notify;

pub fn sample_result() -> AnalysisResult {
    AnalysisResult::new(
        "C-1",
        82,
        RiskLevel::High,
        0.91,
        vec!["Review drafts".to_string()],
    )
    .unwrap()
}

/// Holds calls open until released, to observe in-flight behaviour.
#[derive(Default)]
pub struct Gate {
    release: Mutex<Option<Arc<Notify>>>,
    entered: Notify,
}

impl Gate {
    /// Holds every later call until the returned handle is notified.
    pub fn hold(&self) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        *self.release.lock().unwrap() = Some(release.clone());
        release
    }

    /// Resolves once a held call has started.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    async fn pass(&self) {
        let release = self.release.lock().unwrap().clone();
        if let Some(release) = release {
            self.entered.notify_one();
            release.notified().await;
        }
    }
}

/// Gateway double. Login, analyze and report calls answer from
/// configurable responses, and each kind can be held open.
pub struct MockGateway {
    analyze_response: Mutex<Result<AnalysisResult>>,
    report_error: Mutex<Option<CentinelaError>>,
    login_response: Mutex<Result<LoginGrant>>,
    last_request: Mutex<Option<AnalysisRequest>>,
    report_tokens: Mutex<Vec<String>>,
    analyze_calls: AtomicUsize,
    report_calls: AtomicUsize,
    pub analyze_gate: Gate,
    pub report_gate: Gate,
    pub login_gate: Gate,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            analyze_response: Mutex::new(Ok(sample_result())),
            report_error: Mutex::new(None),
            login_response: Mutex::new(Ok(LoginGrant {
                token: "abc123".to_string(),
                expires_in_secs: None,
            })),
            last_request: Mutex::new(None),
            report_tokens: Mutex::new(Vec::new()),
            analyze_calls: AtomicUsize::new(0),
            report_calls: AtomicUsize::new(0),
            analyze_gate: Gate::default(),
            report_gate: Gate::default(),
            login_gate: Gate::default(),
        }
    }

    pub fn set_analyze_response(&self, response: Result<AnalysisResult>) {
        *self.analyze_response.lock().unwrap() = response;
    }

    pub fn set_login_response(&self, response: Result<LoginGrant>) {
        *self.login_response.lock().unwrap() = response;
    }

    /// Makes report calls fail with `error`.
    pub fn fail_reports(&self, error: CentinelaError) {
        *self.report_error.lock().unwrap() = Some(error);
    }

    pub fn hold_analyze(&self) -> Arc<Notify> {
        self.analyze_gate.hold()
    }

    pub async fn analyze_entered(&self) {
        self.analyze_gate.entered().await;
    }

    /// Tokens that authenticated report calls were sent with, in order.
    pub fn report_tokens(&self) -> Vec<String> {
        self.report_tokens.lock().unwrap().clone()
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }

    pub fn last_analyze_request(&self) -> Option<AnalysisRequest> {
        *self.last_request.lock().unwrap()
    }

    async fn report<T>(&self, session: Option<&Session>, value: T) -> Result<T> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = session.and_then(Session::token) {
            self.report_tokens.lock().unwrap().push(token.to_string());
        }
        self.report_gate.pass().await;
        match self.report_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(value),
        }
    }
}

fn require(session: &Session) -> Result<()> {
    if session.is_authenticated() {
        Ok(())
    } else {
        Err(CentinelaError::validation("Not authenticated"))
    }
}

#[async_trait::async_trait]
impl IntegrityGateway for MockGateway {
    async fn login(&self, _username: &str, _password: &str) -> Result<LoginGrant> {
        self.login_gate.pass().await;
        self.login_response.lock().unwrap().clone()
    }

    async fn register(&self, registration: &Registration) -> Result<RegistrationReceipt> {
        Ok(RegistrationReceipt {
            message: Some("Usuario registrado exitosamente".to_string()),
            username: Some(registration.username.clone()),
        })
    }

    async fn analyze(&self, session: &Session, request: &AnalysisRequest) -> Result<AnalysisResult> {
        require(session)?;
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(*request);

        self.analyze_gate.pass().await;
        self.analyze_response.lock().unwrap().clone()
    }

    async fn batch_analyze(&self, session: &Session, requests: &[AnalysisRequest]) -> Result<BatchReport> {
        require(session)?;
        let report = BatchReport {
            total: requests.len(),
            processed: requests.len(),
            items: requests
                .iter()
                .map(|_| BatchItem::Scored {
                    score: 82,
                    level: RiskLevel::High,
                })
                .collect(),
        };
        self.report(Some(session), report).await
    }

    async fn list_cases(&self, session: &Session, query: &CaseQuery) -> Result<CaseList> {
        require(session)?;
        let cases: Vec<CaseRecord> = serde_json::from_value(serde_json::json!([
            { "case_id": "C-1", "nivel_riesgo": "ALTO", "riesgo_score": 82 }
        ]))
        .map_err(CentinelaError::from)?;
        let returned = cases.len().min(query.limit as usize);
        self.report(
            Some(session),
            CaseList {
                total: cases.len(),
                returned,
                cases,
            },
        )
        .await
    }

    async fn get_case(&self, session: &Session, case_id: &str) -> Result<CaseRecord> {
        require(session)?;
        let record = serde_json::from_value(serde_json::json!({ "case_id": case_id }))
            .map_err(CentinelaError::from)?;
        self.report(Some(session), record).await
    }

    async fn institutional_metrics(&self, session: &Session) -> Result<InstitutionalMetrics> {
        require(session)?;
        self.report(
            Some(session),
            InstitutionalMetrics {
                metrics: serde_json::json!({ "total_casos": 12 }),
            },
        )
        .await
    }

    async fn temporal_metrics(&self, session: &Session, period: MetricsPeriod) -> Result<TemporalMetrics> {
        require(session)?;
        self.report(
            Some(session),
            TemporalMetrics {
                period,
                data: serde_json::json!([]),
            },
        )
        .await
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.report(
            None,
            HealthStatus {
                status: "healthy".to_string(),
                version: Some("2.0.0".to_string()),
                timestamp: None,
            },
        )
        .await
    }

    async fn info(&self) -> Result<ServiceInfo> {
        self.report(
            None,
            ServiceInfo {
                name: "Centinela Digital API".to_string(),
                version: "2.0.0".to_string(),
                description: None,
                endpoints: serde_json::Value::Null,
            },
        )
        .await
    }
}

#[derive(Default)]
pub struct MemorySessionRepository {
    stored: Mutex<Option<Credentials>>,
}

impl MemorySessionRepository {
    pub fn stored(&self) -> Option<Credentials> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn load(&self) -> Result<Option<Credentials>> {
        Ok(self.stored())
    }

    async fn save(&self, credentials: &Credentials) -> Result<()> {
        *self.stored.lock().unwrap() = Some(credentials.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.stored.lock().unwrap() = None;
        Ok(())
    }
}

/// Session manager logged in as `admin` through `gateway`.
pub async fn logged_in(
    gateway: &Arc<MockGateway>,
) -> (Arc<SessionManager>, Arc<MemorySessionRepository>) {
    let repository = Arc::new(MemorySessionRepository::default());
    let sessions = Arc::new(SessionManager::new(gateway.clone(), repository.clone()));
    sessions.login("admin", "admin123").await.unwrap();
    (sessions, repository)
}
