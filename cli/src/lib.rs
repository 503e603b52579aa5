//! `todo`: a command-line todo list kept in an Elasticsearch index.
//!
//! # Overview
//! The binary parses a subcommand, turns it into one store request through
//! `todo_core::StoreClient`, executes that request with a blocking `ureq`
//! transport and prints the result.
//!
//! # Exit status
//! - 0: success, or usage text printed (bare `todo`, `todo add`, `todo check`)
//! - 1: unknown command, or the store request failed
//! - 2: invalid connection settings (clap also uses 2 for malformed flags)

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod report;
pub mod transport;

use std::io::Write;
use std::process::ExitCode;

use cli::{Action, Cli, Plan};
use commands::Todo;
use config::Config;
use transport::{Transport, UreqTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Misconfigured,
}

impl Outcome {
    pub fn code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::Failure => 1,
            Outcome::Misconfigured => 2,
        }
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        ExitCode::from(outcome.code())
    }
}

/// Dispatch a parsed command line against the configured store.
pub fn run(cli: Cli, out: &mut impl Write, err: &mut impl Write) -> Outcome {
    let action = match Plan::from_command(cli.command) {
        Plan::Usage(text) => {
            if let Err(io) = write!(out, "{text}") {
                tracing::error!(error = %io, "could not write usage");
            }
            return Outcome::Success;
        }
        Plan::Unknown(name) => {
            tracing::debug!(command = %name, "unknown command");
            if let Err(io) = writeln!(out, "Unknown command") {
                tracing::error!(error = %io, "could not write unknown command notice");
            }
            return Outcome::Failure;
        }
        Plan::Run(action) => action,
    };

    let config = match Config::from_args(&cli.store) {
        Ok(config) => config,
        Err(e) => {
            if let Err(io) = writeln!(err, "error: {e}") {
                tracing::error!(error = %io, "could not write error report");
            }
            return Outcome::Misconfigured;
        }
    };
    tracing::debug!(
        url = %config.url,
        index = %config.index,
        auth = config.credentials.is_some(),
        "resolved configuration"
    );

    let todo = Todo::new(config.client(), UreqTransport::new(config.timeout));
    execute(&todo, &action, out, err)
}

/// Run one action and report any failure on `err`.
pub fn execute<T: Transport>(
    todo: &Todo<T>,
    action: &Action,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Outcome {
    match todo.run(action, out) {
        Ok(()) => Outcome::Success,
        Err(e) => {
            tracing::debug!(error = %e, ?action, "command failed");
            if let Err(io) = report::render_error(e, err) {
                tracing::error!(error = %io, "could not write error report");
            }
            Outcome::Failure
        }
    }
}
