//! Application layer for Centinela.
//!
//! Use cases that sit between the front-end and the gateway: the analysis
//! orchestrator, the login flow and the report queries. Each one gates on
//! the current session and turns remote errors into display messages.

pub mod login_flow;
pub mod orchestrator;
pub mod reports;

#[cfg(test)]
mod test_support;

pub use login_flow::{FlowOutcome, LoginFlow};
pub use orchestrator::{AnalysisOrchestrator, AnalysisView, SubmitOutcome};
pub use reports::ReportsService;
