// crates/valset-cli/src/main.rs
//
// CLI entrypoint for the validator-set operator tools.
//
// Provides subcommands for inspecting a persisted full validator set,
// previewing the ranked active set with its quorum, and evaluating the
// voting-power and reward formulas offline.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use valset_consensus::StakeConfig;

use commands::active::ActiveCmd;
use commands::reward::RewardCmd;
use commands::snapshot::SnapshotCmd;
use commands::voting_power::VotingPowerCmd;
use output::OutputFormat;

/// valset: inspect validator stake snapshots and evaluate stake formulas.
#[derive(Parser, Debug)]
#[command(
    name = "valset",
    version = "0.1.0",
    about = "Operator tools for the epoch-based validator set and stake accounting"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "valset.toml")]
    config: String,

    /// Emit JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the stored full validator set and its bookkeeping.
    Snapshot(SnapshotCmd),

    /// Rank the active validator set and show its quorum.
    Active(ActiveCmd),

    /// Compute voting power for a stake and exponent.
    VotingPower(VotingPowerCmd),

    /// Compute the maximum epoch reward from explicit inputs.
    Reward(RewardCmd),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, falling back to defaults if the file
    // is not found.
    let (config, load_error) = match StakeConfig::load(&cli.config) {
        Ok(cfg) => (cfg, None),
        Err(e) => (StakeConfig::default(), Some(e)),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    match load_error {
        None => tracing::debug!("Loaded configuration from {}", cli.config),
        Some(e) => tracing::debug!(
            "Could not load config from {}: {}. Using defaults.",
            cli.config,
            e
        ),
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    match &cli.command {
        Commands::Snapshot(cmd) => commands::snapshot::run(cmd, &config, &format)?,
        Commands::Active(cmd) => commands::active::run(cmd, &config, &format)?,
        Commands::VotingPower(cmd) => commands::voting_power::run(cmd, &format)?,
        Commands::Reward(cmd) => commands::reward::run(cmd, &format)?,
    }

    Ok(())
}
