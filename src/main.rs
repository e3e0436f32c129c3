// src/main.rs

//! orgctl
//!
//! Entry point for the orgctl CLI.
//!
//! This binary authenticates as the org's GitHub App and dispatches the
//! maintenance workflows hosted in the org's `.github` repository
//! (task aggregation, repository inventory, security hardening).
//! It delegates all real work to the `runner` module.
//!
//! Responsibilities of this file:
//! - Load `.env` / environment
//! - Initialise logging
//! - Parse CLI arguments
//! - Hand off execution to the runner
//!
//! There is intentionally *no business logic* here.

mod auth;
mod cli;
mod config;
mod github;
mod probe;
mod runner;

use anyhow::Result;
use clap::Parser;

/// Program entry point.
///
/// Uses Tokio because every subcommand drives the async HTTP client
/// through the JWT → installation token → dispatch chain.
#[tokio::main]
async fn main() -> Result<()> {
    // Secrets and overrides may live in a local .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments (check / tasks / inventory / harden)
    let cli = cli::Cli::parse();

    // Delegate execution to the runner
    runner::run(cli).await
}
