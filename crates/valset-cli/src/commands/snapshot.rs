// crates/valset-cli/src/commands/snapshot.rs
//
// `valset snapshot`: dump the stored full validator set.

use clap::Args;
use valset_consensus::StakeConfig;
use valset_core::traits::StakeStore;

use crate::output::{format_json, format_table, OutputFormat, ValidatorRow};

/// Arguments for `valset snapshot`.
#[derive(Debug, Args)]
pub struct SnapshotCmd {
    /// RocksDB directory holding the snapshot (defaults to the configured data_dir).
    #[arg(long)]
    pub db: Option<String>,
}

/// Run the snapshot command.
pub fn run(
    cmd: &SnapshotCmd,
    config: &StakeConfig,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_store(&cmd.db, config)?;
    let state = store.get_full_validator_set()?;

    if *format == OutputFormat::Json {
        println!("{}", format_json(&state));
        return Ok(());
    }

    println!("Full Validator Set");
    println!("------------------");
    println!("  Block:           {}", state.block_number);
    println!("  Epoch:           {}", state.epoch_id);
    println!("  Updated at:      {}", state.updated_at_block_number);
    println!("  Validators:      {}", state.validators.len());
    println!("  Digest:          {}", state.digest()?);
    println!();

    let rows: Vec<ValidatorRow> = state
        .validators
        .iter()
        .enumerate()
        .map(|(i, v)| ValidatorRow::new(i + 1, v))
        .collect();
    println!("{}", format_table(&rows));

    Ok(())
}
