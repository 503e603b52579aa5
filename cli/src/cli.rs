//! Command-line surface of `todo`.

use std::ffi::OsString;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgAction, Args, Parser, Subcommand};

/// Printed when `todo` is run without a subcommand.
pub const USAGE: &str = "\
usage:
  todo list [TERM]   list items, optionally matching a given term
  todo add ITEM      add an item to the list
  todo check TERM    check items that match a given term
  todo clear         clear all items
";

pub const ADD_USAGE: &str = "usage: todo add ITEM\n";
pub const CHECK_USAGE: &str = "usage: todo check TERM\n";

/// Default number of hits `list` asks the store for.
pub const DEFAULT_LIMIT: usize = 100;

pub const DEFAULT_URL: &str = "http://localhost:9200";
pub const DEFAULT_INDEX: &str = "todo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Todo list kept in an Elasticsearch index
#[derive(Debug, Parser)]
#[command(name = "todo")]
#[command(about = "Todo list kept in an Elasticsearch index")]
#[command(version)]
#[command(disable_help_subcommand = true)]
#[command(after_help = r#"CONNECTION:
    The store is reached over HTTP. Every connection flag can also be set
    through its environment variable; flags win over the environment.

EXAMPLES:
    todo add "buy milk"         # Add an unchecked item
    todo list milk              # Items whose text contains the word "milk"
    todo list                   # Every item
    todo check milk             # Mark matching items done
    todo clear                  # Delete every item

    Options of a subcommand go before its TERM or ITEM; everything after
    the first word is taken as text.
"#)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Base URL of the store
    #[arg(
        long,
        env = "TODO_ES_URL",
        default_value = DEFAULT_URL,
        global = true
    )]
    pub url: String,

    /// User for HTTP basic authentication
    #[arg(long, env = "TODO_ES_USER", global = true)]
    pub user: Option<String>,

    /// Password for HTTP basic authentication
    #[arg(long, env = "TODO_ES_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Index holding the items
    #[arg(long, env = "TODO_ES_INDEX", default_value = DEFAULT_INDEX, global = true)]
    pub index: String,

    /// Request timeout
    #[arg(
        long,
        env = "TODO_ES_TIMEOUT",
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        global = true
    )]
    pub timeout: u64,
}

impl Default for StoreArgs {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            user: None,
            password: None,
            index: DEFAULT_INDEX.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List items, optionally matching a given term
    List {
        /// Word to match; every item when omitted. Further words are ignored
        #[arg(value_name = "TERM", allow_hyphen_values = true)]
        term: Vec<String>,

        /// Maximum number of items to show
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Add an item to the list
    Add {
        /// Item text; several words are joined with spaces
        #[arg(value_name = "ITEM", allow_hyphen_values = true)]
        item: Vec<String>,
    },

    /// Check items that match a given term
    Check {
        /// Word to match. Further words are ignored
        #[arg(value_name = "TERM", allow_hyphen_values = true)]
        term: Vec<String>,
    },

    /// Clear all items
    Clear {
        #[arg(hide = true, allow_hyphen_values = true)]
        ignored: Vec<String>,
    },

    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

/// A store operation with its arguments validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List { term: String, limit: usize },
    Add { text: String },
    Check { term: String },
    Clear,
}

/// What a parsed command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Print usage text and exit successfully.
    Usage(&'static str),
    /// First argument is not a known subcommand.
    Unknown(String),
    Run(Action),
}

impl Cli {
    /// Parse a command line, treating a flag clap does not know the same
    /// way as an unknown subcommand name.
    pub fn parse_lenient<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Cli::try_parse_from(args) {
            Err(e) if e.kind() == ErrorKind::UnknownArgument => {
                let name = match e.get(ContextKind::InvalidArg) {
                    Some(ContextValue::String(name)) => name.clone(),
                    _ => String::new(),
                };
                Ok(Cli {
                    store: StoreArgs::default(),
                    verbose: 0,
                    command: Some(Command::Unknown(vec![name])),
                })
            }
            parsed => parsed,
        }
    }
}

impl Plan {
    pub fn from_command(command: Option<Command>) -> Self {
        let Some(command) = command else {
            return Plan::Usage(USAGE);
        };
        match command {
            Command::List { term, limit } => Plan::Run(Action::List {
                term: term.into_iter().next().unwrap_or_default(),
                limit,
            }),
            Command::Add { item } if item.is_empty() => Plan::Usage(ADD_USAGE),
            Command::Add { item } => Plan::Run(Action::Add {
                text: item.join(" "),
            }),
            Command::Check { term } => match term.into_iter().next() {
                Some(term) => Plan::Run(Action::Check { term }),
                None => Plan::Usage(CHECK_USAGE),
            },
            Command::Clear { .. } => Plan::Run(Action::Clear),
            Command::Unknown(args) => Plan::Unknown(args.into_iter().next().unwrap_or_default()),
        }
    }
}
