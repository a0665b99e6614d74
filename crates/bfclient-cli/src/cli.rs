//! CLI argument definitions using clap.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gateway_config::{ConfigLoader, CONFIG_ENV};
use gateway_sdk::{parse_location, Client};
use gateway_telemetry::LoggingConfig;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::commands;
use crate::output::OutputFormat;

/// Business Fabric gateway client - validate and send contract-checked requests
#[derive(Parser, Debug)]
#[command(name = "bfclient")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv); overrides the config debug flag
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, env = CONFIG_ENV, global = true)]
    pub config: Option<PathBuf>,

    /// Load the contract from this URL or file instead of the gateway
    #[arg(long, global = true)]
    pub contract: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a request body against the contract
    Validate(commands::validate::ValidateArgs),

    /// Print the request-body schema of an operation
    Schema(commands::schema::SchemaArgs),

    /// Validate a request body and send it to the gateway
    Send(commands::send::SendArgs),

    /// List the operations the contract declares
    #[command(visible_alias = "ops")]
    Operations(commands::operations::OperationsArgs),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<ExitCode> {
        let format = OutputFormat::from_json_flag(self.json);

        let mut loader = ConfigLoader::new();
        if let Some(path) = &self.config {
            loader = loader.with_file(path);
        }
        let config = loader.load().await.context("Failed to load configuration")?;

        init_logging(self.verbose, self.json, config.bfclient.debug)?;

        let mut builder = Client::builder(config);
        if let Some(location) = &self.contract {
            builder = builder.contract_uri(parse_location(location)?);
        }
        let client = builder
            .build()
            .await
            .context("Failed to initialize gateway client")?;

        match self.command {
            Commands::Validate(args) => commands::validate::execute(args, &client, format),
            Commands::Schema(args) => commands::schema::execute(args, &client, format),
            Commands::Send(args) => commands::send::execute(args, &client, format).await,
            Commands::Operations(args) => commands::operations::execute(args, &client, format),
        }
    }
}

/// Initialize logging from the verbosity count, falling back to the
/// configuration's debug flag.
fn init_logging(verbose: u8, json: bool, debug: bool) -> Result<()> {
    let config = match verbose {
        0 => LoggingConfig::from_debug_flag(debug),
        1 => LoggingConfig::new("info"),
        2 => LoggingConfig::new("debug"),
        _ => LoggingConfig::new("trace"),
    }
    .with_json(json)
    .with_target(verbose > 1);

    gateway_telemetry::init_logging(&config)?;
    Ok(())
}
