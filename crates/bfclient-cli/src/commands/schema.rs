//! Schema command.

use anyhow::Result;
use clap::Args;
use gateway_sdk::{Client, RequestSchema, SchemaFormat};
use std::process::ExitCode;

use crate::output::{self, CommandResult, OutputFormat};

/// Arguments for the schema command.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Path template as declared in the contract
    pub path: String,

    /// HTTP method (any case)
    pub method: String,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

/// Execute the schema command.
pub fn execute(args: SchemaArgs, client: &Client, format: OutputFormat) -> Result<ExitCode> {
    let requested = match format {
        OutputFormat::Json => SchemaFormat::Value,
        OutputFormat::Text => SchemaFormat::from_flags(true, !args.compact),
    };

    let schema = match client.get_request_schema(&args.path, &args.method, requested) {
        Ok(schema) => schema,
        Err(e) => {
            output::gateway_error(&e, format)?;
            return Ok(super::error_exit());
        }
    };

    match schema {
        RequestSchema::Schema(schema) => output::json(&CommandResult::success(schema))?,
        RequestSchema::Json(text) => println!("{text}"),
    }

    Ok(ExitCode::SUCCESS)
}
