//! Resolved connection settings.
//!
//! Flags and `TODO_ES_*` environment variables are merged by clap; this module
//! validates the result and turns it into a `StoreClient`.

use std::time::Duration;

use thiserror::Error;
use todo_core::{Credentials, StoreClient};

use crate::cli::StoreArgs;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("store URL must start with http:// or https://, got {0:?}")]
    BadUrl(String),

    #[error("invalid index name {name:?}: {reason}")]
    BadIndex { name: String, reason: &'static str },

    #[error("a password was given without a user; set --user or TODO_ES_USER")]
    PasswordWithoutUser,

    #[error("timeout must be at least one second")]
    ZeroTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub url: String,
    pub index: String,
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
}

impl Config {
    pub fn from_args(args: &StoreArgs) -> Result<Self, ConfigError> {
        let url = args.url.trim().to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::BadUrl(args.url.clone()));
        }
        check_index(&args.index)?;
        let credentials = match (&args.user, &args.password) {
            (Some(user), password) => Some(Credentials::new(
                user.clone(),
                password.clone().unwrap_or_default(),
            )),
            (None, Some(_)) => return Err(ConfigError::PasswordWithoutUser),
            (None, None) => None,
        };
        if args.timeout == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self {
            url,
            index: args.index.clone(),
            credentials,
            timeout: Duration::from_secs(args.timeout),
        })
    }

    pub fn client(&self) -> StoreClient {
        let client = StoreClient::new(&self.url, &self.index);
        match &self.credentials {
            Some(credentials) => client.with_credentials(credentials.clone()),
            None => client,
        }
    }
}

/// Elasticsearch index naming rules.
fn check_index(name: &str) -> Result<(), ConfigError> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name == "." || name == ".." {
        Some("must not be '.' or '..'")
    } else if name.starts_with(['-', '_', '+']) {
        Some("must not start with '-', '_' or '+'")
    } else if name.chars().any(|c| c.is_uppercase()) {
        Some("must be lowercase")
    } else if name
        .chars()
        .any(|c| matches!(c, '\\' | '/' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' | ',' | '#' | ':'))
    {
        Some("contains a forbidden character")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ConfigError::BadIndex {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
