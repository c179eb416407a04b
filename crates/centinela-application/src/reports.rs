//! Case listings, metrics, batch analysis and service status.
//!
//! Every call reads the session once, refuses to go out without one, and
//! logs the operator out when the service answers 401. A response that
//! arrives after the session changed is dropped, 401 included.

use centinela_core::analysis::AnalysisRequest;
use centinela_core::error::{NOT_AUTHENTICATED, Result as CoreResult, SESSION_CHANGED};
use centinela_core::gateway::IntegrityGateway;
use centinela_core::report::{
    BatchReport, CaseList, CaseQuery, CaseRecord, HealthStatus, InstitutionalMetrics,
    MetricsPeriod, ServiceInfo, TemporalMetrics,
};
use centinela_core::session::{SessionManager, SessionSnapshot};
use std::sync::Arc;

/// Result type of report calls: the value, or a display-ready message.
pub type ReportResult<T> = Result<T, String>;

pub struct ReportsService {
    gateway: Arc<dyn IntegrityGateway>,
    sessions: Arc<SessionManager>,
}

impl ReportsService {
    pub fn new(gateway: Arc<dyn IntegrityGateway>, sessions: Arc<SessionManager>) -> Self {
        Self { gateway, sessions }
    }

    pub async fn cases(&self, query: &CaseQuery) -> ReportResult<CaseList> {
        let snapshot = self.require_session()?;
        let result = self.gateway.list_cases(&snapshot.session, query).await;
        self.settle("list cases", Some(snapshot.generation), result).await
    }

    pub async fn case(&self, case_id: &str) -> ReportResult<CaseRecord> {
        let snapshot = self.require_session()?;
        let result = self.gateway.get_case(&snapshot.session, case_id).await;
        self.settle("get case", Some(snapshot.generation), result).await
    }

    pub async fn institutional_metrics(&self) -> ReportResult<InstitutionalMetrics> {
        let snapshot = self.require_session()?;
        let result = self.gateway.institutional_metrics(&snapshot.session).await;
        self.settle("institutional metrics", Some(snapshot.generation), result)
            .await
    }

    pub async fn temporal_metrics(&self, period: MetricsPeriod) -> ReportResult<TemporalMetrics> {
        let snapshot = self.require_session()?;
        let result = self
            .gateway
            .temporal_metrics(&snapshot.session, period)
            .await;
        self.settle("temporal metrics", Some(snapshot.generation), result)
            .await
    }

    /// Scores several requests in one call. Items come back in order.
    pub async fn batch(&self, requests: &[AnalysisRequest]) -> ReportResult<BatchReport> {
        if requests.is_empty() {
            return Err("A batch needs at least one case".to_string());
        }
        let snapshot = self.require_session()?;
        let result = self
            .gateway
            .batch_analyze(&snapshot.session, requests)
            .await;
        self.settle("batch analyze", Some(snapshot.generation), result)
            .await
    }

    pub async fn health(&self) -> ReportResult<HealthStatus> {
        let result = self.gateway.health().await;
        self.settle("health", None, result).await
    }

    pub async fn info(&self) -> ReportResult<ServiceInfo> {
        let result = self.gateway.info().await;
        self.settle("info", None, result).await
    }

    fn require_session(&self) -> ReportResult<SessionSnapshot> {
        let snapshot = self.sessions.snapshot();
        if snapshot.session.is_authenticated() {
            Ok(snapshot)
        } else {
            Err(NOT_AUTHENTICATED.to_string())
        }
    }

    /// `generation` is the session generation the call was sent under, for
    /// calls that carry a token.
    async fn settle<T>(
        &self,
        operation: &str,
        generation: Option<u64>,
        result: CoreResult<T>,
    ) -> ReportResult<T> {
        if generation.is_some_and(|g| g != self.sessions.generation()) {
            tracing::info!(
                "[Reports] Session changed during {}, dropping response",
                operation
            );
            return Err(SESSION_CHANGED.to_string());
        }

        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!("[Reports] {} failed: {}", operation, e);
                if e.is_authentication() {
                    self.sessions
                        .invalidate(&format!("{} rejected the token", operation))
                        .await;
                }
                Err(e.user_message())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemorySessionRepository, MockGateway, logged_in};
    use centinela_core::analysis::RiskLevel;
    use centinela_core::error::CentinelaError;
    use centinela_core::gateway::LoginGrant;

    #[tokio::test]
    async fn test_cases_require_a_session() {
        let gateway = Arc::new(MockGateway::new());
        let sessions = Arc::new(SessionManager::new(
            gateway.clone(),
            Arc::new(MemorySessionRepository::default()),
        ));
        let reports = ReportsService::new(gateway.clone(), sessions);

        let err = reports.cases(&CaseQuery::default()).await.unwrap_err();
        assert_eq!(err, NOT_AUTHENTICATED);
        assert_eq!(gateway.report_calls(), 0);
    }

    #[tokio::test]
    async fn test_cases_are_returned() {
        let gateway = Arc::new(MockGateway::new());
        let (sessions, _) = logged_in(&gateway).await;
        let reports = ReportsService::new(gateway.clone(), sessions);

        let list = reports.cases(&CaseQuery::default()).await.unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.cases[0].risk_level(), Some(RiskLevel::High));
    }

    #[tokio::test]
    async fn test_unauthorized_report_logs_out() {
        let gateway = Arc::new(MockGateway::new());
        let (sessions, repository) = logged_in(&gateway).await;
        gateway.fail_reports(CentinelaError::authentication("Token inválido"));
        let reports = ReportsService::new(gateway.clone(), sessions.clone());

        let err = reports.institutional_metrics().await.unwrap_err();
        assert_eq!(err, "Token inválido");
        assert!(!sessions.is_authenticated());
        assert_eq!(repository.stored(), None);
    }

    #[tokio::test]
    async fn test_operational_failure_keeps_session() {
        let gateway = Arc::new(MockGateway::new());
        let (sessions, _) = logged_in(&gateway).await;
        gateway.fail_reports(CentinelaError::operational(
            404,
            Some("Caso no encontrado".to_string()),
        ));
        let reports = ReportsService::new(gateway.clone(), sessions.clone());

        let err = reports.case("C-404").await.unwrap_err();
        assert_eq!(err, "Caso no encontrado");
        assert!(sessions.is_authenticated());
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected_before_the_gateway() {
        let gateway = Arc::new(MockGateway::new());
        let (sessions, _) = logged_in(&gateway).await;
        let reports = ReportsService::new(gateway.clone(), sessions);

        assert!(reports.batch(&[]).await.is_err());
        assert_eq!(gateway.report_calls(), 0);

        let report = reports
            .batch(&[AnalysisRequest::default(), AnalysisRequest::default()])
            .await
            .unwrap();
        assert_eq!(report.items.len(), 2);
    }

    #[tokio::test]
    async fn test_health_needs_no_session() {
        let gateway = Arc::new(MockGateway::new());
        let sessions = Arc::new(SessionManager::new(
            gateway.clone(),
            Arc::new(MemorySessionRepository::default()),
        ));
        let reports = ReportsService::new(gateway.clone(), sessions);

        assert!(reports.health().await.unwrap().is_healthy());
        assert_eq!(reports.info().await.unwrap().version, "2.0.0");
    }

    #[tokio::test]
    async fn test_late_unauthorized_answer_keeps_newer_session() {
        let gateway = Arc::new(MockGateway::new());
        let (sessions, repository) = logged_in(&gateway).await;
        let reports = Arc::new(ReportsService::new(gateway.clone(), sessions.clone()));

        let release = gateway.report_gate.hold();
        let task = {
            let reports = reports.clone();
            tokio::spawn(async move { reports.cases(&CaseQuery::default()).await })
        };
        gateway.report_gate.entered().await;

        sessions.logout().await;
        gateway.set_login_response(Ok(LoginGrant {
            token: "tok2".to_string(),
            expires_in_secs: None,
        }));
        sessions.login("admin", "admin123").await.unwrap();
        gateway.fail_reports(CentinelaError::authentication("Token inválido"));
        release.notify_one();

        assert_eq!(task.await.unwrap().unwrap_err(), SESSION_CHANGED);
        assert_eq!(gateway.report_tokens(), vec!["abc123".to_string()]);
        assert_eq!(sessions.current().token(), Some("tok2"));
        assert_eq!(repository.stored().map(|c| c.token), Some("tok2".to_string()));
    }

    #[tokio::test]
    async fn test_result_arriving_after_logout_is_dropped() {
        let gateway = Arc::new(MockGateway::new());
        let (sessions, _) = logged_in(&gateway).await;
        let reports = Arc::new(ReportsService::new(gateway.clone(), sessions.clone()));

        let release = gateway.report_gate.hold();
        let task = {
            let reports = reports.clone();
            tokio::spawn(async move { reports.institutional_metrics().await })
        };
        gateway.report_gate.entered().await;

        sessions.logout().await;
        release.notify_one();

        assert_eq!(task.await.unwrap().unwrap_err(), SESSION_CHANGED);
        assert!(!sessions.is_authenticated());
    }

    #[tokio::test]
    async fn test_temporal_metrics_pass_period_through() {
        let gateway = Arc::new(MockGateway::new());
        let (sessions, _) = logged_in(&gateway).await;
        let reports = ReportsService::new(gateway.clone(), sessions);

        let metrics = reports.temporal_metrics(MetricsPeriod::Monthly).await.unwrap();
        assert_eq!(metrics.period, MetricsPeriod::Monthly);
    }
}
