//! todo - keep a todo list in Elasticsearch
//!
//! Usage:
//!   todo list [TERM]   list items, optionally matching a given term
//!   todo add ITEM      add an item to the list
//!   todo check TERM    check items that match a given term
//!   todo clear         clear all items

use std::io;
use std::process::ExitCode;

use todo_cli::cli::Cli;
use todo_cli::logging;

fn main() -> ExitCode {
    let cli = Cli::parse_lenient(std::env::args_os()).unwrap_or_else(|e| e.exit());
    logging::init(cli.verbose);

    let stdout = io::stdout();
    let stderr = io::stderr();
    todo_cli::run(cli, &mut stdout.lock(), &mut stderr.lock()).into()
}
