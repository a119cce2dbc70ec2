// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strata - storage registration service.
//!
//! Every storage subcommand reads one JSON request (from `--json` or stdin),
//! runs it through the registration orchestrator and prints the result as
//! pretty JSON on stdout. Logs go to stderr.

mod app;
mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use strata_config::StrataConfig;
use strata_core::StrataError;

/// Strata - storage registration service.
#[derive(Parser, Debug)]
#[command(name = "strata", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Storage(StorageCommand),
    /// Inspect the effective configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Storage lifecycle operations.
#[derive(Subcommand, Debug)]
pub(crate) enum StorageCommand {
    /// Register a storage resource bound to a plugin.
    Register(RequestArgs),
    /// Rename a storage resource or replace its tags.
    Update(RequestArgs),
    /// Change the plugin version or options of a storage resource.
    UpdatePlugin(RequestArgs),
    /// Ask the plugin to verify the stored credential.
    VerifyPlugin(RequestArgs),
    Enable(RequestArgs),
    Disable(RequestArgs),
    /// Soft-delete a storage resource.
    Deregister(RequestArgs),
    Get(RequestArgs),
    List(RequestArgs),
    /// Count storage resources grouped by a column.
    Stat(RequestArgs),
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Load and validate configuration, then print it.
    Check,
}

#[derive(Args, Debug)]
pub(crate) struct RequestArgs {
    /// Request body as JSON. Read from stdin when omitted.
    #[arg(long)]
    json: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => strata_config::load_and_validate_path(path),
        None => strata_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            strata_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.service.log_level);

    match cli.command {
        Commands::Config {
            action: ConfigAction::Check,
        } => print_config(&config),
        Commands::Storage(command) => match commands::run(command, &config).await {
            Ok(output) => {
                println!("{output}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                report(&e);
                ExitCode::FAILURE
            }
        },
    }
}

const LOG_TARGETS: &[&str] = &[
    "strata",
    "strata_plugin",
    "strata_secret",
    "strata_service",
    "strata_storage",
];

/// Install the global subscriber. `RUST_LOG` wins over `service.log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives: Vec<String> = LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={log_level}"))
            .collect();
        directives.push("warn".to_string());
        EnvFilter::new(directives.join(","))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn print_config(config: &StrataConfig) -> ExitCode {
    match serde_json::to_string_pretty(config) {
        Ok(text) => {
            eprintln!("strata: config OK (service.name={})", config.service.name);
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&StrataError::Internal(e.to_string()));
            ExitCode::FAILURE
        }
    }
}

fn report(error: &StrataError) {
    let body = serde_json::json!({
        "code": error.code(),
        "message": error.to_string(),
    });
    eprintln!("{body}");
}
