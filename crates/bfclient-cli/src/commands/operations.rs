//! Operations command.

use anyhow::Result;
use clap::Args;
use gateway_sdk::Client;
use serde::Serialize;
use std::process::ExitCode;
use tabled::Tabled;

use crate::output::{self, CommandResult, OutputFormat};

/// Arguments for the operations command.
#[derive(Args, Debug)]
pub struct OperationsArgs {
    /// Only list operations whose path starts with this prefix
    #[arg(long)]
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct OperationRow {
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Body")]
    body: String,
}

#[derive(Debug, Serialize)]
struct OperationsReport {
    contract: String,
    format: String,
    title: Option<String>,
    version: Option<String>,
    base_path: String,
    operations: Vec<OperationRow>,
}

/// Execute the operations command.
pub fn execute(args: OperationsArgs, client: &Client, format: OutputFormat) -> Result<ExitCode> {
    let contract = client.contract();

    let rows: Vec<OperationRow> = contract
        .operations()
        .filter(|(key, _)| {
            args.prefix
                .as_deref()
                .map_or(true, |prefix| key.path.starts_with(prefix))
        })
        .map(|(key, schema)| OperationRow {
            method: key.method.to_string(),
            path: key.path.clone(),
            body: if schema.has_body() { "yes" } else { "no" }.to_string(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let report = OperationsReport {
                contract: client.endpoints().contract_uri().to_string(),
                format: contract.format().to_string(),
                title: contract.title().map(String::from),
                version: contract.version().map(String::from),
                base_path: contract.base_path().to_string(),
                operations: rows,
            };
            output::json(&CommandResult::success(report))?;
        }
        OutputFormat::Text => {
            output::section("Contract");
            output::key_value("Source", client.endpoints().contract_uri().as_str());
            output::key_value("Format", &contract.format().to_string());
            if let Some(title) = contract.title() {
                output::key_value("Title", title);
            }
            if let Some(version) = contract.version() {
                output::key_value("Version", version);
            }
            output::key_value("Base path", contract.base_path());

            output::section("Operations");
            output::table(&rows);
        }
    }

    Ok(ExitCode::SUCCESS)
}
