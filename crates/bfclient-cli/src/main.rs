//! # bfclient
//!
//! Command-line client for the Business Fabric API gateway.
//!
//! ## Usage
//!
//! ```bash
//! # Check a body against the gateway contract
//! bfclient validate /pet post '{"name":"doggie","photoUrls":[]}'
//!
//! # Print the request schema for an operation
//! bfclient schema /pet post
//!
//! # Validate and send
//! bfclient send /pet post --file pet.json
//!
//! # Use a specific configuration file
//! bfclient --config conf/brand-integration-client.toml operations
//! ```

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod output;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    cli.execute().await
}
