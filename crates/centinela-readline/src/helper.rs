use std::borrow::Cow::{self, Borrowed, Owned};

use centinela_core::analysis::{ProductType, Role};
use centinela_core::evidence::EvidenceKey;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use strum::IntoEnumIterator;

use crate::commands::COMMAND_NAMES;

/// Completion, hints and highlighting for the Centinela prompt.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
    evidence_keys: Vec<String>,
    roles: Vec<String>,
    product_types: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMAND_NAMES.iter().map(|c| c.to_string()).collect(),
            evidence_keys: EvidenceKey::iter()
                .map(|k| k.wire_name().to_string())
                .collect(),
            roles: Role::iter().map(|r| r.wire_name().to_string()).collect(),
            product_types: ProductType::iter()
                .map(|p| p.wire_name().to_string())
                .collect(),
        }
    }

    /// Candidates for the word being typed, and where that word starts.
    fn candidates(&self, line: &str) -> (usize, Vec<&String>) {
        match line.split_once(' ') {
            None => (
                0,
                self.commands.iter().filter(|c| c.starts_with(line)).collect(),
            ),
            Some((command, arg)) => {
                let pool = match command {
                    "toggle" | "t" => &self.evidence_keys,
                    "role" => &self.roles,
                    "product" => &self.product_types,
                    _ => return (0, Vec::new()),
                };
                let arg_lower = arg.to_lowercase();
                (
                    command.len() + 1,
                    pool.iter()
                        .filter(|c| c.to_lowercase().starts_with(&arg_lower))
                        .collect(),
                )
            }
        }
    }
}

impl Default for CliHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, candidates) = self.candidates(&line[..pos]);
        Ok((
            start,
            candidates
                .into_iter()
                .map(|c| Pair {
                    display: c.clone(),
                    replacement: c.clone(),
                })
                .collect(),
        ))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let command = line.split_whitespace().next().unwrap_or("");
        if self.commands.iter().any(|c| c == command) {
            Owned(format!("{}{}", command.bright_cyan(), &line[command.len()..]))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let (start, candidates) = self.candidates(line);
        let typed = &line[start..];
        if typed.is_empty() {
            return None;
        }
        candidates
            .into_iter()
            .find(|c| c.len() > typed.len() && c.starts_with(typed))
            .map(|c| c[typed.len()..].to_string())
    }
}

impl Validator for CliHelper {}
