//! Rendering of command output and failures.

use std::io::{self, Write};

use todo_core::{ApiError, Item};

use crate::commands::CommandError;

/// Print one `[X] text` / `[ ] text` line per item; returns how many.
pub fn render_items<'a>(
    items: impl IntoIterator<Item = &'a Item>,
    out: &mut impl Write,
) -> io::Result<usize> {
    let mut count = 0;
    for item in items {
        writeln!(out, "{item}")?;
        count += 1;
    }
    Ok(count)
}

/// Describe a failed command on `out` (normally stderr).
///
/// A structured store error prints its status and every field of the error
/// object, indented by two spaces. Anything else prints with its cause chain.
pub fn render_error(err: CommandError, out: &mut impl Write) -> io::Result<()> {
    match err {
        CommandError::Api(ApiError::Store { status, detail }) => {
            writeln!(out, "Error {status}")?;
            for (key, value) in &detail {
                writeln!(out, "  {key}: {value}")?;
            }
            Ok(())
        }
        CommandError::Api(ApiError::HttpError { status, body }) => {
            writeln!(out, "Error {status}")?;
            let body = body.trim();
            if !body.is_empty() {
                writeln!(out, "{body}")?;
            }
            Ok(())
        }
        other => writeln!(out, "Error: {:?}", anyhow::Error::new(other)),
    }
}
