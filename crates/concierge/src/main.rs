// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concierge - cost-and-risk policy engine for a personal AI agent.
//!
//! This is the binary entry point. Each subcommand runs one stage of the
//! per-turn pipeline against the configured usage ledger.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod plan;
mod usage;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use concierge_config::model::ConciergeConfig;
use concierge_core::ConciergeError;

/// Concierge - cost-and-risk policy engine for a personal AI agent.
#[derive(Parser, Debug)]
#[command(name = "concierge", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Plan a turn: model selection, confidence guidance, upgrade advice.
    Plan(plan::PlanArgs),
    /// Check requested tools against the approval gate.
    Gate(plan::GateArgs),
    /// Show spend for today, a session, and per model.
    Usage(usage::UsageArgs),
    /// Append a finished turn's token usage to the ledger.
    Record(usage::RecordArgs),
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => concierge_config::load_and_validate_path(path),
        None => concierge_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            concierge_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Plan(args)) => plan::run_plan(&config, &args, cli.json).await,
        Some(Commands::Gate(args)) => plan::run_gate(&args, cli.json),
        Some(Commands::Usage(args)) => usage::run_usage(&config, &args, cli.json).await,
        Some(Commands::Record(args)) => usage::run_record(&config, &args, cli.json).await,
        Some(Commands::Config) => print_config(&config, cli.json),
        None => {
            println!("concierge: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn print_config(config: &ConciergeConfig, json: bool) -> Result<(), ConciergeError> {
    let rendered = if json {
        serde_json::to_string_pretty(config).map_err(|e| ConciergeError::Internal(e.to_string()))?
    } else {
        toml::to_string_pretty(config).map_err(|e| ConciergeError::Internal(e.to_string()))?
    };
    println!("{rendered}");
    Ok(())
}

/// Print `value` as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), ConciergeError> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|e| ConciergeError::Internal(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}

/// Initialize the tracing subscriber with an env filter.
///
/// `RUST_LOG` wins when set; otherwise `concierge*` crates log at the
/// configured level and everything else at `warn`. Output goes to stderr so
/// `--json` stdout stays parseable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("concierge={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
