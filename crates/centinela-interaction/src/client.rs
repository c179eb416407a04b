//! `IntegrityGateway` over HTTP using `reqwest`.

use async_trait::async_trait;
use centinela_core::analysis::{AnalysisRequest, AnalysisResult};
use centinela_core::config::ApiSettings;
use centinela_core::error::{CentinelaError, NOT_AUTHENTICATED, Result};
use centinela_core::gateway::{IntegrityGateway, LoginGrant, Registration, RegistrationReceipt};
use centinela_core::report::{
    BatchReport, CaseList, CaseQuery, CaseRecord, HealthStatus, InstitutionalMetrics,
    MetricsPeriod, ServiceInfo, TemporalMetrics,
};
use centinela_core::session::Session;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::wire::{
    AnalyzeResponse, BatchBody, BatchResponse, CaseListResponse, CaseResponse, ErrorBody,
    LoginBody, LoginResponse, MetricsResponse, RegisterBody, RegisterResponse, TemporalResponse,
};

/// Client for the Centinela REST API.
///
/// Holds no session state: every authenticated call takes the [`Session`]
/// to use, so a logout between two calls can never leak the old token.
#[derive(Clone)]
pub struct CentinelaApiClient {
    client: Client,
    base_url: String,
}

impl CentinelaApiClient {
    /// Creates a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CentinelaError::config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(CentinelaError::config("API base URL is empty"));
        }

        Ok(Self { client, base_url })
    }

    pub fn from_settings(settings: &ApiSettings) -> Result<Self> {
        Self::new(
            settings.normalized_base_url(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the session token, or fails locally when there is none.
    fn authorized(&self, request: RequestBuilder, session: &Session) -> Result<RequestBuilder> {
        let token = session
            .token()
            .ok_or_else(|| CentinelaError::validation(NOT_AUTHENTICATED))?;
        Ok(request.bearer_auth(token))
    }

    /// Sends a request and decodes a 2xx body as `T`.
    ///
    /// - no response: `Network`
    /// - 401: `Authentication` with the server's message
    /// - other non-2xx: `Operational` with the server's message
    /// - undecodable 2xx: `Operational` "unexpected response"
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, label: &str) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("[Gateway] {} failed before a response: {}", label, e);
            CentinelaError::network(e.to_string())
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            tracing::warn!("[Gateway] {} body could not be read: {}", label, e);
            CentinelaError::network(e.to_string())
        })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message);
            tracing::info!("[Gateway] {} returned {}", label, status);
            return Err(if status == StatusCode::UNAUTHORIZED {
                CentinelaError::Authentication { message }
            } else {
                CentinelaError::operational(status.as_u16(), message)
            });
        }

        tracing::debug!("[Gateway] {} returned {}", label, status);
        let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &body
        };
        serde_json::from_slice(body).map_err(|e| unexpected(status, e))
    }
}

fn unexpected(status: StatusCode, cause: impl std::fmt::Display) -> CentinelaError {
    tracing::warn!("[Gateway] Unexpected response ({}): {}", status, cause);
    CentinelaError::operational(
        status.as_u16(),
        Some(format!("Unexpected response from server: {}", cause)),
    )
}

#[async_trait]
impl IntegrityGateway for CentinelaApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginGrant> {
        let request = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&LoginBody { username, password });

        let response: LoginResponse = self.execute(request, "login").await?;
        Ok(LoginGrant {
            token: response.token,
            expires_in_secs: response.expira_en,
        })
    }

    async fn register(&self, registration: &Registration) -> Result<RegistrationReceipt> {
        let request = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&RegisterBody {
                username: &registration.username,
                password: &registration.password,
                email: &registration.email,
            });

        let response: RegisterResponse = self.execute(request, "register").await?;
        Ok(RegistrationReceipt {
            message: response.mensaje,
            username: response.usuario,
        })
    }

    async fn analyze(
        &self,
        session: &Session,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult> {
        let http = self.authorized(self.client.post(self.url("/api/analyze")), session)?;
        let response: AnalyzeResponse = self.execute(http.json(request), "analyze").await?;

        response
            .into_result()
            .map_err(|e| unexpected(StatusCode::OK, e.user_message()))
    }

    async fn batch_analyze(
        &self,
        session: &Session,
        requests: &[AnalysisRequest],
    ) -> Result<BatchReport> {
        if requests.is_empty() {
            return Err(CentinelaError::validation("A batch needs at least one case"));
        }

        let http = self.authorized(self.client.post(self.url("/api/batch/analyze")), session)?;
        let response: BatchResponse = self
            .execute(http.json(&BatchBody { casos: requests }), "batch analyze")
            .await?;
        Ok(response.into())
    }

    async fn list_cases(&self, session: &Session, query: &CaseQuery) -> Result<CaseList> {
        let mut params: Vec<(&str, String)> = vec![
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
        ];
        if let Some(level) = query.level {
            params.push(("nivel", level.wire_name().to_string()));
        }
        if let Some(role) = query.role {
            params.push(("rol", role.wire_name().to_string()));
        }

        let http = self.authorized(self.client.get(self.url("/api/cases")), session)?;
        let response: CaseListResponse = self.execute(http.query(&params), "list cases").await?;
        Ok(response.into())
    }

    async fn get_case(&self, session: &Session, case_id: &str) -> Result<CaseRecord> {
        let case_id = case_id.trim();
        if case_id.is_empty() || case_id.contains('/') {
            return Err(CentinelaError::validation(format!(
                "Invalid case id: '{}'",
                case_id
            )));
        }

        let http = self.authorized(
            self.client.get(self.url(&format!("/api/case/{}", case_id))),
            session,
        )?;
        let response: CaseResponse = self.execute(http, "get case").await?;
        Ok(response.case)
    }

    async fn institutional_metrics(&self, session: &Session) -> Result<InstitutionalMetrics> {
        let http = self.authorized(
            self.client.get(self.url("/api/metrics/institutional")),
            session,
        )?;
        let response: MetricsResponse = self.execute(http, "institutional metrics").await?;
        Ok(InstitutionalMetrics {
            metrics: response.metrics,
        })
    }

    async fn temporal_metrics(
        &self,
        session: &Session,
        period: MetricsPeriod,
    ) -> Result<TemporalMetrics> {
        let http = self.authorized(self.client.get(self.url("/api/metrics/temporal")), session)?;
        let response: TemporalResponse = self
            .execute(http.query(&[("period", period.as_query())]), "temporal metrics")
            .await?;
        Ok(TemporalMetrics {
            period: response.period_or(period),
            data: response.data,
        })
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.execute(self.client.get(self.url("/health")), "health")
            .await
    }

    async fn info(&self) -> Result<ServiceInfo> {
        self.execute(self.client.get(self.url("/api/info")), "info")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client =
            CentinelaApiClient::new(" http://localhost:5000/ ", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/health"), "http://localhost:5000/health");
    }

    #[test]
    fn test_blank_base_url_is_a_config_error() {
        let err = CentinelaApiClient::new("  ", Duration::from_secs(5))
            .err()
            .unwrap();
        assert!(matches!(err, CentinelaError::Config(_)));
    }
}
