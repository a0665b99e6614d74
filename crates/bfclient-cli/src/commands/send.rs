//! Send command.

use anyhow::Result;
use clap::Args;
use gateway_sdk::{Client, GatewayError};
use serde::Serialize;
use serde_json::Value;
use std::process::ExitCode;

use super::BodyArgs;
use crate::output::{self, CommandResult, OutputFormat};

/// Arguments for the send command.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Request path, e.g. /pet/42 (matched against the contract templates)
    pub path: String,

    /// HTTP method (any case)
    pub method: String,

    #[command(flatten)]
    pub body: BodyArgs,
}

#[derive(Debug, Serialize)]
struct SendReport {
    status: u16,
    body: Value,
}

/// Execute the send command.
pub async fn execute(args: SendArgs, client: &Client, format: OutputFormat) -> Result<ExitCode> {
    let body = args.body.read()?;

    let response = match client.send_request(&args.path, &args.method, &body).await {
        Ok(response) => response,
        Err(e) => {
            output::gateway_error(&e, format)?;
            return Ok(match e {
                GatewayError::ValidationFailed { .. } => ExitCode::FAILURE,
                _ => super::error_exit(),
            });
        }
    };

    match format {
        OutputFormat::Json => {
            let body = response
                .json::<Value>()
                .unwrap_or_else(|_| Value::String(response.text()));
            let report = SendReport {
                status: response.status_code(),
                body,
            };
            if response.is_success() {
                output::json(&CommandResult::success(report))?;
            } else {
                let message = format!("Gateway responded with {}", report.status);
                output::json(&CommandResult::failure_with(report, message))?;
            }
        }
        OutputFormat::Text => {
            if response.is_success() {
                output::success(&format!("Gateway responded with {}", response.status));
            } else {
                output::error(&format!("Gateway responded with {}", response.status));
            }
            let text = response.text();
            if !text.is_empty() {
                println!("{text}");
            }
        }
    }

    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
