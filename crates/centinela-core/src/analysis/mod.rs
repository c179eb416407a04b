//! Analysis domain module.
//!
//! - `model`: request/result types (`AnalysisRequest`, `AnalysisResult`,
//!   `Role`, `ProductType`, `RiskLevel`)
//! - `state`: per-flow request progress (`RequestState`)

mod model;
mod state;

pub use model::{AnalysisRequest, AnalysisResult, ProductType, RiskLevel, Role};
pub use state::RequestState;
