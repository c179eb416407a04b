//! Interface to the remote analysis service.
//!
//! The HTTP implementation lives in `centinela-interaction`; this trait keeps
//! the session and orchestration logic independent of the transport.

use crate::analysis::{AnalysisRequest, AnalysisResult};
use crate::error::Result;
use crate::report::{
    BatchReport, CaseList, CaseQuery, CaseRecord, HealthStatus, InstitutionalMetrics,
    MetricsPeriod, ServiceInfo, TemporalMetrics,
};
use crate::session::Session;

/// Token issued by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub token: String,
    /// Lifetime announced by the server, when it sends one.
    pub expires_in_secs: Option<u64>,
}

impl std::fmt::Debug for LoginGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginGrant")
            .field("token", &"<redacted>")
            .field("expires_in_secs", &self.expires_in_secs)
            .finish()
    }
}

/// New account details.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReceipt {
    pub message: Option<String>,
    pub username: Option<String>,
}

/// Typed operations against the analysis service.
///
/// Each call is a single request/response exchange with no retry and no
/// caching. Operations taking a [`Session`] send its token as a bearer
/// credential and fail with a validation error, without touching the
/// network, when the session is anonymous.
#[async_trait::async_trait]
pub trait IntegrityGateway: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<LoginGrant>;

    async fn register(&self, registration: &Registration) -> Result<RegistrationReceipt>;

    async fn analyze(&self, session: &Session, request: &AnalysisRequest)
    -> Result<AnalysisResult>;

    async fn batch_analyze(
        &self,
        session: &Session,
        requests: &[AnalysisRequest],
    ) -> Result<BatchReport>;

    async fn list_cases(&self, session: &Session, query: &CaseQuery) -> Result<CaseList>;

    async fn get_case(&self, session: &Session, case_id: &str) -> Result<CaseRecord>;

    async fn institutional_metrics(&self, session: &Session) -> Result<InstitutionalMetrics>;

    async fn temporal_metrics(
        &self,
        session: &Session,
        period: MetricsPeriod,
    ) -> Result<TemporalMetrics>;

    async fn health(&self) -> Result<HealthStatus>;

    async fn info(&self) -> Result<ServiceInfo>;
}
