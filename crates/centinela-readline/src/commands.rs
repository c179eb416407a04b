//! REPL command parsing.

use centinela_core::analysis::{RiskLevel, Role};
use centinela_core::report::{CaseQuery, MetricsPeriod};

/// Command names offered for completion, in help order.
pub const COMMAND_NAMES: &[&str] = &[
    "help", "login", "logout", "register", "whoami", "role", "product", "toggle", "form", "reset",
    "analyze", "result", "clear", "queue", "batch", "cases", "case", "metrics", "health", "info",
    "quit",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Login { username: String, password: String },
    Logout,
    Register {
        username: String,
        password: String,
        email: String,
    },
    WhoAmI,
    /// Shows the choices when `None`.
    Role(Option<String>),
    Product(Option<String>),
    Toggle(String),
    Form,
    Reset,
    Analyze,
    Result,
    Clear,
    /// Adds the current form to the batch queue.
    Queue,
    Batch,
    Cases(CaseQuery),
    Case(String),
    /// Institutional metrics, or the time series for a period.
    Metrics(Option<MetricsPeriod>),
    Health,
    Info,
    Quit,
}

impl Command {
    /// Parses one input line. Errors are display-ready usage messages.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();
        let name = name.trim_start_matches('/').to_ascii_lowercase();

        let command = match name.as_str() {
            "help" | "?" => Command::Help,
            "login" => match args.as_slice() {
                [username, password] => Command::Login {
                    username: username.to_string(),
                    password: password.to_string(),
                },
                _ => return Err(usage("login <username> <password>")),
            },
            "logout" => Command::Logout,
            "register" => match args.as_slice() {
                [username, password, email] => Command::Register {
                    username: username.to_string(),
                    password: password.to_string(),
                    email: email.to_string(),
                },
                _ => return Err(usage("register <username> <password> <email>")),
            },
            "whoami" | "status" => Command::WhoAmI,
            "role" => Command::Role(non_empty(rest)),
            "product" => Command::Product(non_empty(rest)),
            "toggle" | "t" => match non_empty(rest) {
                Some(key) => Command::Toggle(key),
                None => return Err(usage("toggle <evidence-key>")),
            },
            "form" => Command::Form,
            "reset" => Command::Reset,
            "analyze" | "submit" => Command::Analyze,
            "result" => Command::Result,
            "clear" => Command::Clear,
            "queue" => Command::Queue,
            "batch" => Command::Batch,
            "cases" => Command::Cases(parse_case_query(&args)?),
            "case" => match args.as_slice() {
                [id] => Command::Case(id.to_string()),
                _ => return Err(usage("case <case-id>")),
            },
            "metrics" => match args.as_slice() {
                [] => Command::Metrics(None),
                [period] => Command::Metrics(Some(
                    MetricsPeriod::parse(period).map_err(|e| e.user_message())?,
                )),
                _ => return Err(usage("metrics [daily|weekly|monthly]")),
            },
            "health" => Command::Health,
            "info" => Command::Info,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command: '{}'. Type 'help'.", other)),
        };

        Ok(command)
    }

}

/// Whether a raw input line may carry a password. Decided on the command
/// word alone so malformed `login` and `register` lines are covered too.
pub fn is_sensitive_line(line: &str) -> bool {
    let word = line.split_whitespace().next().unwrap_or("");
    matches!(
        word.trim_start_matches('/').to_ascii_lowercase().as_str(),
        "login" | "register"
    )
}

/// `cases [level=ALTO] [role=student] [limit=N] [offset=N]`
fn parse_case_query(args: &[&str]) -> Result<CaseQuery, String> {
    let mut query = CaseQuery::default();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            return Err(usage("cases [level=LEVEL] [role=ROLE] [limit=N] [offset=N]"));
        };
        match key.to_ascii_lowercase().as_str() {
            "level" | "nivel" => {
                let level = RiskLevel::from_name(value)
                    .ok_or_else(|| format!("Unknown risk level: '{}'", value))?;
                query = query.with_level(level);
            }
            "role" | "rol" => {
                query.role = Some(Role::parse(value).map_err(|e| e.user_message())?);
            }
            "limit" => query = query.with_limit(parse_number(key, value)?),
            "offset" => query.offset = parse_number(key, value)?,
            other => return Err(format!("Unknown filter: '{}'", other)),
        }
    }
    Ok(query)
}

fn parse_number(key: &str, value: &str) -> Result<u32, String> {
    value
        .parse()
        .map_err(|_| format!("{} must be a non-negative number, got '{}'", key, value))
}

fn non_empty(rest: &str) -> Option<String> {
    (!rest.is_empty()).then(|| rest.to_string())
}

fn usage(text: &str) -> String {
    format!("Usage: {}", text)
}
