//! Analysis request/result domain models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};

use crate::error::{CentinelaError, Result};
use crate::evidence::EvidenceSet;

/// Role of the person who produced the work under review.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    #[default]
    #[serde(rename = "Estudiante")]
    #[strum(serialize = "Estudiante", serialize = "student")]
    Student,
    #[serde(rename = "Docente-investigador")]
    #[strum(
        serialize = "Docente-investigador",
        serialize = "supervising-researcher",
        serialize = "supervising researcher"
    )]
    SupervisingResearcher,
    #[serde(rename = "Coinvestigador externo")]
    #[strum(
        serialize = "Coinvestigador externo",
        serialize = "external-co-researcher",
        serialize = "external co-researcher"
    )]
    ExternalCoResearcher,
}

impl Role {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Student => "Estudiante",
            Self::SupervisingResearcher => "Docente-investigador",
            Self::ExternalCoResearcher => "Coinvestigador externo",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::SupervisingResearcher => "Supervising researcher",
            Self::ExternalCoResearcher => "External co-researcher",
        }
    }

    /// Parses a wire or English role name.
    pub fn parse(input: &str) -> Result<Self> {
        Self::from_str(input.trim())
            .map_err(|_| CentinelaError::validation(format!("Unknown role: '{input}'")))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of academic work product being assessed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ProductType {
    #[default]
    #[serde(rename = "Ensayo")]
    #[strum(serialize = "Ensayo", serialize = "essay")]
    Essay,
    #[serde(rename = "Tesis")]
    #[strum(serialize = "Tesis", serialize = "thesis")]
    Thesis,
    #[serde(rename = "Artículo científico")]
    #[strum(
        serialize = "Artículo científico",
        serialize = "scientific-article",
        serialize = "scientific article"
    )]
    ScientificArticle,
    #[serde(rename = "Informe técnico")]
    #[strum(
        serialize = "Informe técnico",
        serialize = "technical-report",
        serialize = "technical report"
    )]
    TechnicalReport,
}

impl ProductType {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Essay => "Ensayo",
            Self::Thesis => "Tesis",
            Self::ScientificArticle => "Artículo científico",
            Self::TechnicalReport => "Informe técnico",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Essay => "Essay",
            Self::Thesis => "Thesis",
            Self::ScientificArticle => "Scientific article",
            Self::TechnicalReport => "Technical report",
        }
    }

    /// Parses a wire or English product type name.
    pub fn parse(input: &str) -> Result<Self> {
        Self::from_str(input.trim())
            .map_err(|_| CentinelaError::validation(format!("Unknown product type: '{input}'")))
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse risk classification returned by the scoring service.
///
/// The service speaks Spanish (`BAJO`, `MEDIO`, `ALTO`); English spellings
/// are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "BAJO", alias = "LOW")]
    Low,
    #[serde(rename = "MEDIO", alias = "MEDIUM")]
    Medium,
    #[serde(rename = "ALTO", alias = "HIGH")]
    High,
}

impl RiskLevel {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Low => "BAJO",
            Self::Medium => "MEDIO",
            Self::High => "ALTO",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Lenient lookup used for loosely-typed case records.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "BAJO" | "LOW" => Some(Self::Low),
            "MEDIO" | "MEDIUM" => Some(Self::Medium),
            "ALTO" | "HIGH" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable snapshot of the evidence form taken at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AnalysisRequest {
    #[serde(rename = "rol")]
    pub role: Role,
    #[serde(rename = "tipo_producto")]
    pub product_type: ProductType,
    #[serde(rename = "evidencias")]
    pub evidence: EvidenceSet,
}

/// Risk assessment produced by the remote service for one case.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub case_id: String,
    /// 0–100
    pub score: u8,
    pub risk_level: RiskLevel,
    /// 0.0–1.0
    pub confidence: f64,
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    /// Builds a result, rejecting out-of-range score or confidence values.
    pub fn new(
        case_id: impl Into<String>,
        score: i64,
        risk_level: RiskLevel,
        confidence: f64,
        recommendations: Vec<String>,
    ) -> Result<Self> {
        let score = u8::try_from(score)
            .ok()
            .filter(|s| *s <= 100)
            .ok_or_else(|| CentinelaError::validation(format!("score out of range: {score}")))?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(CentinelaError::validation(format!(
                "confidence out of range: {confidence}"
            )));
        }

        Ok(Self {
            case_id: case_id.into(),
            score,
            risk_level,
            confidence,
            recommendations,
        })
    }

    /// Confidence as a percentage with one decimal, e.g. `"91.0%"`.
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }
}
