// crates/valset-cli/src/commands/active.rs
//
// `valset active`: rank the stored full validator set into the active set
// that the next epoch boundary would produce, with its quorum.

use clap::Args;
use serde::Serialize;
use valset_consensus::StakeConfig;
use valset_core::traits::StakeStore;
use valset_core::validator::{AccountSet, ValidatorSet};

use crate::output::{format_json, format_table, OutputFormat, ValidatorRow};

/// Arguments for `valset active`.
#[derive(Debug, Args)]
pub struct ActiveCmd {
    /// RocksDB directory holding the snapshot (defaults to the configured data_dir).
    #[arg(long)]
    pub db: Option<String>,

    /// Maximum active set size (defaults to the configured max_validator_set_size).
    #[arg(long)]
    pub max: Option<usize>,
}

#[derive(Serialize)]
struct ActiveReport {
    block: u64,
    epoch: u64,
    total_voting_power: String,
    quorum_size: String,
    validators: AccountSet,
}

/// Run the active command.
pub fn run(
    cmd: &ActiveCmd,
    config: &StakeConfig,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let max = cmd.max.unwrap_or(config.max_validator_set_size);
    if max == 0 {
        return Err("--max must be greater than zero".into());
    }

    let store = super::open_store(&cmd.db, config)?;
    let state = store.get_full_validator_set()?;
    let set = ValidatorSet::new(state.validators.get_sorted(max));

    if *format == OutputFormat::Json {
        let report = ActiveReport {
            block: state.block_number,
            epoch: state.epoch_id,
            total_voting_power: set.total_voting_power().to_string(),
            quorum_size: set.quorum_size().to_string(),
            validators: set.accounts().clone(),
        };
        println!("{}", format_json(&report));
        return Ok(());
    }

    println!("Active Validator Set (max {})", max);
    println!("-----------------------------");
    println!("  As of block:         {}", state.block_number);
    println!("  Validators:          {}", set.len());
    println!("  Total voting power:  {}", set.total_voting_power());
    println!("  Quorum size:         {}", set.quorum_size());
    println!();

    let rows: Vec<ValidatorRow> = set
        .accounts()
        .iter()
        .enumerate()
        .map(|(i, v)| ValidatorRow::new(i + 1, v))
        .collect();
    println!("{}", format_table(&rows));

    Ok(())
}
