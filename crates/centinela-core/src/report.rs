//! Read-side models: stored cases, batch results, metrics and service info.
//!
//! The analysis service owns the shape of these payloads. Only the fields the
//! client renders are typed; everything else is kept as JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analysis::{RiskLevel, Role};
use crate::error::{CentinelaError, Result};

/// Filters for listing stored cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseQuery {
    pub limit: u32,
    pub offset: u32,
    pub level: Option<RiskLevel>,
    /// Role filter, sent as its wire name.
    pub role: Option<Role>,
}

impl Default for CaseQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            level: None,
            role: None,
        }
    }
}

impl CaseQuery {
    pub fn with_level(mut self, level: RiskLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// One stored case as returned by the service.
///
/// The server has used both Spanish and English field names over time, so
/// each typed field accepts either spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    #[serde(alias = "caso_id")]
    pub case_id: Option<String>,
    #[serde(rename = "rol")]
    pub role: Option<String>,
    #[serde(rename = "tipo_producto")]
    pub product_type: Option<String>,
    #[serde(alias = "riesgo_score", alias = "overall_score")]
    pub score: Option<f64>,
    #[serde(alias = "nivel_riesgo", alias = "overall_level")]
    pub level: Option<String>,
    #[serde(alias = "confianza")]
    pub confidence: Option<f64>,
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CaseRecord {
    /// Parsed risk level; `None` for unknown labels such as `DESCONOCIDO`.
    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.level.as_deref().and_then(RiskLevel::from_name)
    }
}

/// A page of stored cases.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseList {
    pub total: usize,
    pub returned: usize,
    pub cases: Vec<CaseRecord>,
}

/// Outcome of one item in a batch analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchItem {
    Scored { score: u8, level: RiskLevel },
    Rejected { error: String },
}

/// Result of a batch analysis, items in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub total: usize,
    pub processed: usize,
    pub items: Vec<BatchItem>,
}

/// Aggregation window for temporal metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricsPeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl MetricsPeriod {
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "daily" | "diaria" => Ok(Self::Daily),
            "weekly" | "semanal" => Ok(Self::Weekly),
            "monthly" | "mensual" => Ok(Self::Monthly),
            _ => Err(CentinelaError::validation(format!(
                "Unknown period: '{input}' (expected daily, weekly or monthly)"
            ))),
        }
    }
}

/// Institution-wide aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct InstitutionalMetrics {
    pub metrics: Value,
}

impl InstitutionalMetrics {
    /// Total analysed cases, wherever the current report format puts it.
    pub fn total_cases(&self) -> Option<u64> {
        self.metrics
            .pointer("/resumen_general/total_casos_analizados")
            .or_else(|| self.metrics.get("total_casos"))
            .and_then(Value::as_u64)
    }
}

/// Time series for one aggregation period.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalMetrics {
    pub period: MetricsPeriod,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub endpoints: Value,
}
