//! Command dispatch for the REPL.
//!
//! Local commands (form edits, help) print immediately. Anything that talks
//! to the service runs on a background task and sends its rendered lines to
//! the output channel, so the prompt never waits on the network.

use std::sync::Arc;

use centinela_application::{
    AnalysisOrchestrator, FlowOutcome, LoginFlow, ReportsService, SubmitOutcome,
};
use centinela_core::analysis::AnalysisRequest;
use centinela_core::evidence::EvidenceForm;
use centinela_core::gateway::Registration;
use centinela_core::report::{CaseQuery, MetricsPeriod};
use centinela_core::session::SessionManager;
use colored::Colorize;
use tokio::sync::mpsc;

use crate::commands::Command;
use crate::render;

pub type Output = mpsc::Sender<Vec<String>>;

#[derive(Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App {
    sessions: Arc<SessionManager>,
    login: Arc<LoginFlow>,
    orchestrator: Arc<AnalysisOrchestrator>,
    reports: Arc<ReportsService>,
    form: EvidenceForm,
    queue: Vec<AnalysisRequest>,
    output: Output,
}

impl App {
    pub fn new(
        sessions: Arc<SessionManager>,
        login: Arc<LoginFlow>,
        orchestrator: Arc<AnalysisOrchestrator>,
        reports: Arc<ReportsService>,
        output: Output,
    ) -> Self {
        Self {
            sessions,
            login,
            orchestrator,
            reports,
            form: EvidenceForm::new(),
            queue: Vec::new(),
            output,
        }
    }

    pub fn handle(&mut self, command: Command) -> Control {
        match command {
            Command::Help => print_lines(render::help_lines()),
            Command::Quit => return Control::Quit,
            Command::WhoAmI => self.whoami(),
            Command::Login { username, password } => self.spawn_login(username, password),
            Command::Logout => {
                let login = self.login.clone();
                self.spawn(async move {
                    login.logout().await;
                    vec!["Logged out.".bright_green().to_string()]
                });
            }
            Command::Register {
                username,
                password,
                email,
            } => {
                let login = self.login.clone();
                let registration = Registration {
                    username,
                    password,
                    email,
                };
                self.spawn(async move {
                    match login.register(&registration).await {
                        Ok(receipt) => vec![
                            receipt
                                .message
                                .unwrap_or_else(|| "Account created.".to_string())
                                .bright_green()
                                .to_string(),
                        ],
                        Err(message) => vec![message.red().to_string()],
                    }
                });
            }
            Command::Role(None) => print_lines(render::render_roles()),
            Command::Role(Some(name)) => match self.form.set_role_named(&name) {
                Ok(role) => println!("{} {}", "Role set to".bright_black(), role.label()),
                Err(e) => eprintln!("{}", e.user_message().red()),
            },
            Command::Product(None) => print_lines(render::render_product_types()),
            Command::Product(Some(name)) => match self.form.set_product_type_named(&name) {
                Ok(product) => {
                    println!("{} {}", "Product type set to".bright_black(), product.label())
                }
                Err(e) => eprintln!("{}", e.user_message().red()),
            },
            Command::Toggle(name) => match self.form.toggle_named(&name) {
                Ok((key, present)) => {
                    let state = if present { "on".green() } else { "off".bright_black() };
                    println!("{} {}", key.wire_name(), state);
                }
                Err(e) => eprintln!("{}", e.user_message().red()),
            },
            Command::Form => print_lines(render::render_form(&self.form)),
            Command::Reset => {
                self.form.reset();
                println!("{}", "Form cleared.".bright_black());
            }
            Command::Analyze => self.spawn_analyze(),
            Command::Result => print_lines(render::render_view(&self.orchestrator.view())),
            Command::Clear => {
                self.orchestrator.clear_result();
                println!("{}", "Result cleared.".bright_black());
            }
            Command::Queue => {
                self.queue.push(self.form.snapshot());
                println!(
                    "{} {} case(s) queued",
                    "Batch:".bright_black(),
                    self.queue.len()
                );
            }
            Command::Batch => self.spawn_batch(),
            Command::Cases(query) => self.spawn_cases(query),
            Command::Case(id) => {
                let reports = self.reports.clone();
                self.spawn(async move {
                    match reports.case(&id).await {
                        Ok(case) => render::render_case(&case),
                        Err(message) => vec![message.red().to_string()],
                    }
                });
            }
            Command::Metrics(period) => self.spawn_metrics(period),
            Command::Health => {
                let reports = self.reports.clone();
                self.spawn(async move {
                    match reports.health().await {
                        Ok(health) => render::render_health(&health),
                        Err(message) => vec![message.red().to_string()],
                    }
                });
            }
            Command::Info => {
                let reports = self.reports.clone();
                self.spawn(async move {
                    match reports.info().await {
                        Ok(info) => render::render_info(&info),
                        Err(message) => vec![message.red().to_string()],
                    }
                });
            }
        }
        Control::Continue
    }

    fn whoami(&self) {
        match self.sessions.current().username() {
            Some(username) => println!("{} {}", "Logged in as".bright_black(), username.bold()),
            None => println!("{}", "Not logged in.".yellow()),
        }
    }

    fn spawn_login(&self, username: String, password: String) {
        let login = self.login.clone();
        self.spawn(async move {
            match login.login(&username, &password).await {
                FlowOutcome::Completed(session) => vec![format!(
                    "{} {}",
                    "Logged in as".bright_green(),
                    session.username().unwrap_or(&username).bold()
                )],
                FlowOutcome::Failed(message) => vec![message.red().to_string()],
                FlowOutcome::AlreadyInFlight => {
                    vec!["A login is already in progress.".yellow().to_string()]
                }
                FlowOutcome::Stale => vec![
                    "Logged out while the login was in progress; not logged in."
                        .yellow()
                        .to_string(),
                ],
            }
        });
    }

    fn spawn_analyze(&self) {
        let request = self.form.snapshot();
        let orchestrator = self.orchestrator.clone();
        self.spawn(async move {
            match orchestrator.submit_request(request).await {
                SubmitOutcome::Completed(result) => render::render_result(&result),
                SubmitOutcome::Failed(message) => {
                    vec![format!("Analysis failed: {}", message).red().to_string()]
                }
                SubmitOutcome::AlreadyInFlight => {
                    vec!["An analysis is already in progress.".yellow().to_string()]
                }
                SubmitOutcome::Stale => vec![
                    "Session changed during analysis; result discarded."
                        .yellow()
                        .to_string(),
                ],
            }
        });
    }

    fn spawn_batch(&mut self) {
        if self.queue.is_empty() {
            eprintln!("{}", "Nothing queued. Use 'queue' to add the current form.".yellow());
            return;
        }
        let requests = std::mem::take(&mut self.queue);
        let reports = self.reports.clone();
        self.spawn(async move {
            match reports.batch(&requests).await {
                Ok(report) => render::render_batch(&report),
                Err(message) => vec![
                    format!("Batch of {} failed: {}", requests.len(), message)
                        .red()
                        .to_string(),
                ],
            }
        });
    }

    fn spawn_cases(&self, query: CaseQuery) {
        let reports = self.reports.clone();
        self.spawn(async move {
            match reports.cases(&query).await {
                Ok(list) => render::render_cases(&list),
                Err(message) => vec![message.red().to_string()],
            }
        });
    }

    fn spawn_metrics(&self, period: Option<MetricsPeriod>) {
        let reports = self.reports.clone();
        self.spawn(async move {
            match period {
                None => match reports.institutional_metrics().await {
                    Ok(metrics) => {
                        let title = match metrics.total_cases() {
                            Some(total) => format!("Institutional metrics ({} cases)", total),
                            None => "Institutional metrics".to_string(),
                        };
                        render::render_json(&title, &metrics.metrics)
                    }
                    Err(message) => vec![message.red().to_string()],
                },
                Some(period) => match reports.temporal_metrics(period).await {
                    Ok(metrics) => render::render_json(
                        &format!("Metrics by {} period", metrics.period.as_query()),
                        &metrics.data,
                    ),
                    Err(message) => vec![message.red().to_string()],
                },
            }
        });
    }

    fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = Vec<String>> + Send + 'static,
    {
        let output = self.output.clone();
        tokio::spawn(async move {
            let lines = task.await;
            if output.send(lines).await.is_err() {
                tracing::debug!("[Repl] Output closed before a background result arrived");
            }
        });
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}
