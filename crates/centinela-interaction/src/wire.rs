//! Request and response bodies as the service spells them.

use centinela_core::analysis::{AnalysisRequest, AnalysisResult, RiskLevel};
use centinela_core::error::{CentinelaError, Result};
use centinela_core::report::{BatchItem, BatchReport, CaseList, CaseRecord, MetricsPeriod};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
pub(crate) struct LoginBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub expira_en: Option<u64>,
}

#[derive(Serialize)]
pub(crate) struct RegisterBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct RegisterResponse {
    #[serde(default)]
    pub mensaje: Option<String>,
    #[serde(default)]
    pub usuario: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct BatchBody<'a> {
    pub casos: &'a [AnalysisRequest],
}

/// Error body shared by every endpoint: `{"error": "...", "code": "..."}`.
#[derive(Deserialize, Default)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}

#[derive(Deserialize)]
pub(crate) struct AnalyzeResponse {
    pub case_id: String,
    pub analysis: AnalysisPayload,
}

#[derive(Deserialize)]
pub(crate) struct AnalysisPayload {
    pub overall_score: f64,
    pub overall_level: String,
    pub confidence: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl AnalyzeResponse {
    pub fn into_result(self) -> Result<AnalysisResult> {
        let level = RiskLevel::from_name(&self.analysis.overall_level).ok_or_else(|| {
            CentinelaError::validation(format!(
                "unknown risk level '{}'",
                self.analysis.overall_level
            ))
        })?;

        AnalysisResult::new(
            self.case_id,
            whole_score(self.analysis.overall_score)?,
            level,
            self.analysis.confidence,
            self.analysis.recommendations,
        )
    }
}

#[derive(Deserialize)]
pub(crate) struct BatchResponse {
    pub total: usize,
    pub procesados: usize,
    #[serde(default)]
    pub resultados: Vec<BatchEntry>,
}

#[derive(Deserialize)]
pub(crate) struct BatchEntry {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BatchEntry {
    fn into_item(self) -> BatchItem {
        if self.status.as_deref() == Some("error") {
            return BatchItem::Rejected {
                error: self.error.unwrap_or_else(|| "Unknown error".to_string()),
            };
        }

        let score = self
            .score
            .ok_or_else(|| CentinelaError::validation("missing score"))
            .and_then(whole_score)
            .and_then(|s| {
                u8::try_from(s)
                    .ok()
                    .filter(|s| *s <= 100)
                    .ok_or_else(|| CentinelaError::validation(format!("score out of range: {s}")))
            });
        let level = self.level.as_deref().and_then(RiskLevel::from_name);

        match (score, level) {
            (Ok(score), Some(level)) => BatchItem::Scored { score, level },
            (Err(e), _) => BatchItem::Rejected {
                error: e.user_message(),
            },
            (Ok(_), None) => BatchItem::Rejected {
                error: format!(
                    "unknown risk level '{}'",
                    self.level.unwrap_or_default()
                ),
            },
        }
    }
}

impl From<BatchResponse> for BatchReport {
    fn from(response: BatchResponse) -> Self {
        BatchReport {
            total: response.total,
            processed: response.procesados,
            items: response
                .resultados
                .into_iter()
                .map(BatchEntry::into_item)
                .collect(),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct CaseListResponse {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub returned: Option<usize>,
    #[serde(default)]
    pub cases: Vec<CaseRecord>,
}

impl From<CaseListResponse> for CaseList {
    fn from(response: CaseListResponse) -> Self {
        CaseList {
            total: response.total,
            returned: response.returned.unwrap_or(response.cases.len()),
            cases: response.cases,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct CaseResponse {
    pub case: CaseRecord,
}

#[derive(Deserialize)]
pub(crate) struct MetricsResponse {
    pub metrics: Value,
}

#[derive(Deserialize)]
pub(crate) struct TemporalResponse {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl TemporalResponse {
    /// Period echoed by the server, or `requested` when absent or unknown.
    pub fn period_or(&self, requested: MetricsPeriod) -> MetricsPeriod {
        self.period
            .as_deref()
            .and_then(|p| MetricsPeriod::parse(p).ok())
            .unwrap_or(requested)
    }
}

/// Scores travel as JSON numbers; accept `82` and `82.0` alike.
fn whole_score(raw: f64) -> Result<i64> {
    if !raw.is_finite() || raw.fract() != 0.0 {
        return Err(CentinelaError::validation(format!(
            "score is not a whole number: {raw}"
        )));
    }
    Ok(raw as i64)
}
