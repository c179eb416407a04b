//! Turns domain values into coloured terminal lines.

use centinela_application::AnalysisView;
use centinela_core::analysis::{AnalysisResult, ProductType, RequestState, RiskLevel, Role};
use centinela_core::evidence::EvidenceForm;
use centinela_core::report::{
    BatchItem, BatchReport, CaseList, CaseRecord, HealthStatus, ServiceInfo,
};
use colored::{ColoredString, Colorize};
use serde_json::Value;
use strum::IntoEnumIterator;

pub fn risk_badge(level: RiskLevel) -> ColoredString {
    let text = level.wire_name();
    match level {
        RiskLevel::Low => text.green().bold(),
        RiskLevel::Medium => text.yellow().bold(),
        RiskLevel::High => text.red().bold(),
    }
}

pub fn render_result(result: &AnalysisResult) -> Vec<String> {
    let mut lines = vec![
        format!("{} {}", "Case:".bright_black(), result.case_id),
        format!(
            "{} {}/100  {}",
            "Score:".bright_black(),
            result.score,
            risk_badge(result.risk_level)
        ),
        format!(
            "{} {}",
            "Confidence:".bright_black(),
            result.confidence_percent()
        ),
    ];
    if !result.recommendations.is_empty() {
        lines.push("Recommendations:".bright_black().to_string());
        lines.extend(result.recommendations.iter().map(|r| format!("  - {}", r)));
    }
    lines
}

pub fn render_view(view: &AnalysisView) -> Vec<String> {
    match &view.state {
        RequestState::Idle => match &view.last_result {
            Some(result) => render_result(result),
            None => vec!["No analysis yet. Type 'analyze' to submit the form."
                .bright_black()
                .to_string()],
        },
        RequestState::InFlight => vec!["Analysis in progress...".yellow().to_string()],
        RequestState::Succeeded(result) => render_result(result),
        RequestState::Failed(message) => {
            let mut lines = vec![format!("Analysis failed: {}", message).red().to_string()];
            if let Some(previous) = &view.last_result {
                lines.push("Last successful result:".bright_black().to_string());
                lines.extend(render_result(previous));
            }
            lines
        }
    }
}

pub fn render_form(form: &EvidenceForm) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} {} ({})",
            "Role:".bright_black(),
            form.role().label(),
            form.role().wire_name()
        ),
        format!(
            "{} {} ({})",
            "Product:".bright_black(),
            form.product_type().label(),
            form.product_type().wire_name()
        ),
        "Evidence:".bright_black().to_string(),
    ];
    for (key, present) in form.evidence().iter() {
        let mark = if present {
            "[x]".bright_green()
        } else {
            "[ ]".bright_black()
        };
        lines.push(format!("  {} {:<22} {}", mark, key.wire_name(), key.label()));
    }
    lines
}

pub fn render_roles() -> Vec<String> {
    Role::iter()
        .map(|role| format!("  {:<24} {}", role.wire_name(), role.label()))
        .collect()
}

pub fn render_product_types() -> Vec<String> {
    ProductType::iter()
        .map(|product| format!("  {:<24} {}", product.wire_name(), product.label()))
        .collect()
}

pub fn render_cases(list: &CaseList) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} of {} cases",
        "Showing".bright_black(),
        list.returned,
        list.total
    )];
    lines.extend(list.cases.iter().map(case_line));
    lines
}

fn case_line(case: &CaseRecord) -> String {
    let level = match case.risk_level() {
        Some(level) => risk_badge(level).to_string(),
        None => case.level.clone().unwrap_or_else(|| "-".to_string()),
    };
    let score = case
        .score
        .map(|s| format!("{:.0}", s))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "  {:<12} {:>4}  {:<6} {} / {}",
        case.case_id.as_deref().unwrap_or("?"),
        score,
        level,
        case.role.as_deref().unwrap_or("-"),
        case.product_type.as_deref().unwrap_or("-")
    )
}

pub fn render_case(case: &CaseRecord) -> Vec<String> {
    let mut lines = vec![case_line(case)];
    if let Some(confidence) = case.confidence {
        lines.push(format!(
            "  {} {:.1}%",
            "Confidence:".bright_black(),
            confidence * 100.0
        ));
    }
    if let Some(timestamp) = &case.timestamp {
        lines.push(format!("  {} {}", "Recorded:".bright_black(), timestamp));
    }
    for (key, value) in &case.extra {
        lines.push(format!("  {} {}", format!("{}:", key).bright_black(), value));
    }
    lines
}

pub fn render_batch(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} of {} cases",
        "Processed".bright_black(),
        report.processed,
        report.total
    )];
    for (index, item) in report.items.iter().enumerate() {
        lines.push(match item {
            BatchItem::Scored { score, level } => {
                format!("  #{:<3} {:>3}/100  {}", index + 1, score, risk_badge(*level))
            }
            BatchItem::Rejected { error } => {
                format!("  #{:<3} {}", index + 1, error.red())
            }
        });
    }
    lines
}

pub fn render_health(health: &HealthStatus) -> Vec<String> {
    let status = if health.is_healthy() {
        health.status.green()
    } else {
        health.status.red()
    };
    vec![format!(
        "{} {}  {} {}",
        "Service:".bright_black(),
        status,
        "version".bright_black(),
        health.version.as_deref().unwrap_or("unknown")
    )]
}

pub fn render_info(info: &ServiceInfo) -> Vec<String> {
    let mut lines = vec![format!("{} {}", info.name.bold(), info.version)];
    if let Some(description) = &info.description {
        lines.push(description.bright_black().to_string());
    }
    lines
}

/// Pretty-prints a loosely typed report section.
pub fn render_json(title: &str, value: &Value) -> Vec<String> {
    let mut lines = vec![title.bold().to_string()];
    let body = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    lines.extend(body.lines().map(|line| format!("  {}", line)));
    lines
}

pub fn help_lines() -> Vec<String> {
    [
        ("login <user> <password>", "Log in"),
        ("logout", "Log out and forget the stored session"),
        ("register <user> <password> <email>", "Create an account"),
        ("whoami", "Show the current session"),
        ("role [name]", "Show or set the author's role"),
        ("product [name]", "Show or set the product type"),
        ("toggle <key>", "Flip an evidence flag"),
        ("form", "Show the evidence form"),
        ("reset", "Clear the form"),
        ("analyze", "Submit the form for analysis"),
        ("result", "Show the analysis state"),
        ("clear", "Forget the last result"),
        ("queue", "Add the current form to the batch queue"),
        ("batch", "Analyze every queued form"),
        ("cases [level=..] [role=..] [limit=..] [offset=..]", "List stored cases"),
        ("case <id>", "Show one case"),
        ("metrics [daily|weekly|monthly]", "Institutional or temporal metrics"),
        ("health / info", "Service status"),
        ("quit", "Exit"),
    ]
    .iter()
    .map(|(usage, text)| format!("  {:<50} {}", usage.bright_cyan(), text))
    .collect()
}
