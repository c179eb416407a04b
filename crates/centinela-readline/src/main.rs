mod app;
mod commands;
mod helper;
mod logging;
mod render;

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use centinela_application::{AnalysisOrchestrator, LoginFlow, ReportsService};
use centinela_core::gateway::IntegrityGateway;
use centinela_core::session::{SessionManager, SessionRepository};
use centinela_infrastructure::{CentinelaPaths, ConfigService, TomlSessionRepository};
use centinela_interaction::CentinelaApiClient;

use app::{App, Control};
use commands::Command;
use helper::CliHelper;

/// Entry point for the Centinela Digital REPL.
///
/// Restores the stored session, then reads commands until `quit` or EOF.
/// Service calls run on background tasks; their output is printed by a
/// single printer task so lines from different calls never interleave.
#[tokio::main]
async fn main() -> Result<()> {
    let config = ConfigService::new().get_config();

    let _log_guard = match CentinelaPaths::logs_dir() {
        Ok(dir) => match logging::init(&dir, &config.logging.level) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("{}", format!("Logging disabled: {}", e).yellow());
                None
            }
        },
        Err(e) => {
            eprintln!("{}", format!("Logging disabled: {}", e).yellow());
            None
        }
    };
    tracing::info!("[Main] Starting against {}", config.api.normalized_base_url());

    // ===== Backend =====
    let gateway: Arc<dyn IntegrityGateway> =
        Arc::new(CentinelaApiClient::from_settings(&config.api)?);
    let repository: Arc<dyn SessionRepository> =
        Arc::new(TomlSessionRepository::default_location()?);
    let sessions = Arc::new(SessionManager::new(gateway.clone(), repository));
    let restored = sessions.restore().await;

    let login = Arc::new(LoginFlow::new(sessions.clone()));
    let orchestrator = Arc::new(AnalysisOrchestrator::new(gateway.clone(), sessions.clone()));
    let reports = Arc::new(ReportsService::new(gateway, sessions.clone()));

    let (output_tx, mut output_rx) = mpsc::channel::<Vec<String>>(32);
    let printer = tokio::spawn(async move {
        while let Some(lines) = output_rx.recv().await {
            for line in lines {
                println!("{}", line);
            }
        }
    });

    let mut app = App::new(sessions, login, orchestrator, reports, output_tx);

    // ===== REPL =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Centinela Digital ===".bright_magenta().bold());
    println!(
        "{} {}",
        "Service:".bright_black(),
        config.api.normalized_base_url()
    );
    match restored.username() {
        Some(username) => println!("{} {}", "Welcome back,".bright_green(), username.bold()),
        None => println!(
            "{}",
            "Not logged in. Use 'login <user> <password>'.".bright_black()
        ),
    }
    println!("{}", "Type 'help' for commands or 'quit' to exit.".bright_black());
    println!();

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                if !commands::is_sensitive_line(trimmed) {
                    let _ = rl.add_history_entry(trimmed);
                }

                let command = match Command::parse(trimmed) {
                    Ok(command) => command,
                    Err(message) => {
                        eprintln!("{}", message.red());
                        continue;
                    }
                };

                if app.handle(command) == Control::Quit {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    // Dropping the app closes the output channel once in-flight tasks finish.
    drop(app);
    let _ = printer.await;
    tracing::info!("[Main] Exiting");

    Ok(())
}
