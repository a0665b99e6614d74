//! Validate command.

use anyhow::Result;
use clap::Args;
use gateway_sdk::{Client, ValidationOutcome};
use serde::Serialize;
use std::process::ExitCode;
use tabled::Tabled;

use super::BodyArgs;
use crate::output::{self, CommandResult, OutputFormat};

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Request path, e.g. /pet/42 (matched against the contract templates)
    pub path: String,

    /// HTTP method (any case)
    pub method: String,

    #[command(flatten)]
    pub body: BodyArgs,
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    valid: bool,
    path: String,
    method: String,
    violations: Vec<ViolationRow>,
}

#[derive(Debug, Serialize, Tabled)]
struct ViolationRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// Execute the validate command.
pub fn execute(args: ValidateArgs, client: &Client, format: OutputFormat) -> Result<ExitCode> {
    let body = args.body.read()?;

    let outcome = match client.check(&args.path, &args.method, &body) {
        Ok(outcome) => outcome,
        Err(e) => {
            output::gateway_error(&e, format)?;
            return Ok(super::error_exit());
        }
    };

    let rows: Vec<ViolationRow> = outcome
        .violations()
        .iter()
        .map(|v| ViolationRow {
            field: v.field().to_string(),
            reason: v.reason(),
        })
        .collect();

    let report = ValidationReport {
        valid: outcome.is_valid(),
        path: args.path,
        method: args.method.to_uppercase(),
        violations: rows,
    };

    match format {
        OutputFormat::Json => {
            let result = if report.valid {
                CommandResult::success(report)
            } else {
                CommandResult::failure_with(report, "Request body does not match the contract")
            };
            output::json(&result)?;
        }
        OutputFormat::Text => match &outcome {
            ValidationOutcome::Valid => {
                output::success(&format!(
                    "{} {} request body is valid",
                    report.method, report.path
                ));
            }
            ValidationOutcome::Invalid(violations) => {
                output::error(&format!(
                    "{} {} request body has {} violation(s)",
                    report.method,
                    report.path,
                    violations.len()
                ));
                output::table(&report.violations);
            }
        },
    }

    Ok(if outcome.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
