//! Tests for `SessionManager` against in-memory gateway and storage doubles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::analysis::{AnalysisRequest, AnalysisResult};
use crate::error::{CentinelaError, DEFAULT_LOGIN_ERROR, Result};
use crate::gateway::{IntegrityGateway, LoginGrant, Registration, RegistrationReceipt};
use crate::report::{
    BatchReport, CaseList, CaseQuery, CaseRecord, HealthStatus, InstitutionalMetrics,
    MetricsPeriod, ServiceInfo, TemporalMetrics,
};
use crate::session::{Credentials, Session, SessionManager, SessionRepository};

// Mock gateway: only the auth endpoints are meaningful here
struct MockGateway {
    login_response: Mutex<Result<LoginGrant>>,
    login_calls: AtomicUsize,
    register_calls: AtomicUsize,
}

impl MockGateway {
    fn granting(token: &str) -> Self {
        Self::responding(Ok(LoginGrant {
            token: token.to_string(),
            expires_in_secs: Some(86400),
        }))
    }

    fn responding(response: Result<LoginGrant>) -> Self {
        Self {
            login_response: Mutex::new(response),
            login_calls: AtomicUsize::new(0),
            register_calls: AtomicUsize::new(0),
        }
    }

    fn set_response(&self, response: Result<LoginGrant>) {
        *self.login_response.lock().unwrap() = response;
    }
}

fn unused<T>() -> Result<T> {
    Err(CentinelaError::internal("not used in session tests"))
}

#[async_trait::async_trait]
impl IntegrityGateway for MockGateway {
    async fn login(&self, _username: &str, _password: &str) -> Result<LoginGrant> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.login_response.lock().unwrap().clone()
    }

    async fn register(&self, registration: &Registration) -> Result<RegistrationReceipt> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        Ok(RegistrationReceipt {
            message: Some("Usuario registrado exitosamente".to_string()),
            username: Some(registration.username.clone()),
        })
    }

    async fn analyze(&self, _: &Session, _: &AnalysisRequest) -> Result<AnalysisResult> {
        unused()
    }

    async fn batch_analyze(&self, _: &Session, _: &[AnalysisRequest]) -> Result<BatchReport> {
        unused()
    }

    async fn list_cases(&self, _: &Session, _: &CaseQuery) -> Result<CaseList> {
        unused()
    }

    async fn get_case(&self, _: &Session, _: &str) -> Result<CaseRecord> {
        unused()
    }

    async fn institutional_metrics(&self, _: &Session) -> Result<InstitutionalMetrics> {
        unused()
    }

    async fn temporal_metrics(&self, _: &Session, _: MetricsPeriod) -> Result<TemporalMetrics> {
        unused()
    }

    async fn health(&self) -> Result<HealthStatus> {
        unused()
    }

    async fn info(&self) -> Result<ServiceInfo> {
        unused()
    }
}

// Mock SessionRepository for testing
#[derive(Default)]
struct MockSessionRepository {
    stored: Mutex<Option<Credentials>>,
    fail_reads: bool,
}

impl MockSessionRepository {
    fn failing_reads() -> Self {
        Self {
            stored: Mutex::new(None),
            fail_reads: true,
        }
    }

    fn stored(&self) -> Option<Credentials> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SessionRepository for MockSessionRepository {
    async fn load(&self) -> Result<Option<Credentials>> {
        if self.fail_reads {
            return Err(CentinelaError::Serialization {
                format: "TOML".to_string(),
                message: "expected `=`".to_string(),
            });
        }
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

fn manager_with(
    gateway: Arc<MockGateway>,
    repository: Arc<MockSessionRepository>,
) -> SessionManager {
    SessionManager::new(gateway, repository)
}

#[tokio::test]
async fn test_restore_without_stored_session_is_anonymous() {
    let manager = manager_with(
        Arc::new(MockGateway::granting("abc123")),
        Arc::new(MockSessionRepository::default()),
    );

    let session = manager.restore().await;
    assert!(!session.is_authenticated());
    assert!(!manager.is_authenticated());
}

#[tokio::test]
async fn test_restore_with_unreadable_storage_is_anonymous() {
    let manager = manager_with(
        Arc::new(MockGateway::granting("abc123")),
        Arc::new(MockSessionRepository::failing_reads()),
    );

    let session = manager.restore().await;
    assert_eq!(session, Session::anonymous());
}

#[tokio::test]
async fn test_restore_ignores_incomplete_credentials() {
    let repository = Arc::new(MockSessionRepository::default());
    repository
        .save(&Credentials::new("", "admin"))
        .await
        .unwrap();
    let manager = manager_with(Arc::new(MockGateway::granting("abc123")), repository);

    assert!(!manager.restore().await.is_authenticated());
}

#[tokio::test]
async fn test_login_sets_token_and_username_and_survives_restart() {
    let gateway = Arc::new(MockGateway::granting("abc123"));
    let repository = Arc::new(MockSessionRepository::default());
    let manager = manager_with(gateway.clone(), repository.clone());
    manager.restore().await;

    let session = manager.login("admin", "admin123").await.unwrap();
    assert_eq!(session.token(), Some("abc123"));
    assert_eq!(session.username(), Some("admin"));
    assert_eq!(manager.current(), session);
    assert_eq!(repository.stored(), Some(Credentials::new("abc123", "admin")));

    // Simulated restart: a fresh manager over the same storage
    let restarted = manager_with(gateway, repository);
    let restored = restarted.restore().await;
    assert_eq!(restored.token(), Some("abc123"));
    assert_eq!(restored.username(), Some("admin"));
}

#[tokio::test]
async fn test_login_failure_carries_server_message_and_keeps_prior_session() {
    let gateway = Arc::new(MockGateway::granting("first-token"));
    let repository = Arc::new(MockSessionRepository::default());
    let manager = manager_with(gateway.clone(), repository.clone());
    let prior = manager.login("admin", "admin123").await.unwrap();

    gateway.set_response(Err(CentinelaError::authentication("Credenciales inválidas")));
    let err = manager.login("admin", "wrong").await.unwrap_err();

    assert_eq!(err, CentinelaError::authentication("Credenciales inválidas"));
    assert_eq!(manager.current(), prior);
    assert_eq!(
        repository.stored(),
        Some(Credentials::new("first-token", "admin"))
    );
}

#[tokio::test]
async fn test_login_failure_without_message_uses_default() {
    let gateway = Arc::new(MockGateway::responding(Err(CentinelaError::operational(
        500, None,
    ))));
    let manager = manager_with(gateway, Arc::new(MockSessionRepository::default()));

    let err = manager.login("admin", "admin123").await.unwrap_err();
    assert!(err.is_authentication());
    assert_eq!(err.user_message(), DEFAULT_LOGIN_ERROR);
    assert!(!manager.is_authenticated());
}

#[tokio::test]
async fn test_login_network_failure_stays_network() {
    let gateway = Arc::new(MockGateway::responding(Err(CentinelaError::network(
        "connection refused",
    ))));
    let manager = manager_with(gateway, Arc::new(MockSessionRepository::default()));

    let err = manager.login("admin", "admin123").await.unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn test_login_with_blank_credentials_never_reaches_gateway() {
    let gateway = Arc::new(MockGateway::granting("abc123"));
    let manager = manager_with(gateway.clone(), Arc::new(MockSessionRepository::default()));

    let err = manager.login("   ", "secret").await.unwrap_err();
    assert!(err.is_validation());
    let err = manager.login("admin", "").await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(gateway.login_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_login_with_empty_token_is_rejected() {
    let manager = manager_with(
        Arc::new(MockGateway::granting("")),
        Arc::new(MockSessionRepository::default()),
    );

    let err = manager.login("admin", "admin123").await.unwrap_err();
    assert!(err.is_authentication());
    assert!(!manager.is_authenticated());
}

#[tokio::test]
async fn test_logout_clears_both_halves_and_is_idempotent() {
    let repository = Arc::new(MockSessionRepository::default());
    let manager = manager_with(Arc::new(MockGateway::granting("abc123")), repository.clone());
    manager.login("admin", "admin123").await.unwrap();
    let generation = manager.generation();

    manager.logout().await;
    let session = manager.current();
    assert_eq!(session.token(), None);
    assert_eq!(session.username(), None);
    assert_eq!(repository.stored(), None);
    assert_eq!(manager.generation(), generation + 1);

    manager.logout().await;
    assert_eq!(manager.current(), Session::anonymous());
    assert_eq!(manager.generation(), generation + 1);
}

#[tokio::test]
async fn test_subscribers_observe_login_and_logout() {
    let manager = manager_with(
        Arc::new(MockGateway::granting("abc123")),
        Arc::new(MockSessionRepository::default()),
    );
    let mut updates = manager.subscribe();

    manager.login("admin", "admin123").await.unwrap();
    assert!(updates.has_changed().unwrap());
    assert!(updates.borrow_and_update().session.is_authenticated());

    manager.invalidate("token expired").await;
    assert!(updates.has_changed().unwrap());
    assert!(!updates.borrow_and_update().session.is_authenticated());
}

#[tokio::test]
async fn test_register_validates_and_leaves_session_untouched() {
    let gateway = Arc::new(MockGateway::granting("abc123"));
    let manager = manager_with(gateway.clone(), Arc::new(MockSessionRepository::default()));

    let missing_email = Registration {
        username: "ana".to_string(),
        password: "pw".to_string(),
        email: " ".to_string(),
    };
    assert!(manager.register(&missing_email).await.unwrap_err().is_validation());
    assert_eq!(gateway.register_calls.load(Ordering::SeqCst), 0);

    let registration = Registration {
        email: "ana@example.org".to_string(),
        ..missing_email
    };
    let receipt = manager.register(&registration).await.unwrap();
    assert_eq!(receipt.username.as_deref(), Some("ana"));
    assert!(!manager.is_authenticated());
}
