//! CLI command implementations.

pub mod operations;
pub mod schema;
pub mod send;
pub mod validate;

use anyhow::{Context, Result};
use clap::Args;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit code for errors that are not validation failures.
pub(crate) const EXIT_ERROR: u8 = 2;

/// Request body taken inline, from a file, or from stdin.
#[derive(Args, Debug, Default)]
pub struct BodyArgs {
    /// Request body as JSON text
    #[arg(conflicts_with = "file")]
    pub body: Option<String>,

    /// Read the request body from a file ("-" for stdin)
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl BodyArgs {
    /// Resolve the body text.
    ///
    /// With neither an inline body nor a file, stdin is read when it is piped;
    /// otherwise the body is empty.
    pub fn read(&self) -> Result<String> {
        if let Some(body) = &self.body {
            return Ok(body.clone());
        }

        match &self.file {
            Some(path) if path.as_os_str() == "-" => read_stdin(),
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read request body from {}", path.display())),
            None if !std::io::stdin().is_terminal() => read_stdin(),
            None => Ok(String::new()),
        }
    }
}

fn read_stdin() -> Result<String> {
    let mut body = String::new();
    std::io::stdin()
        .read_to_string(&mut body)
        .context("Failed to read request body from stdin")?;
    Ok(body)
}

/// Exit code for a gateway error that was already reported.
pub(crate) fn error_exit() -> ExitCode {
    ExitCode::from(EXIT_ERROR)
}
