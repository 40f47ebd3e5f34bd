// crates/valset-cli/src/commands/mod.rs
//
// Command module declarations for the valset CLI.

pub mod active;
pub mod reward;
pub mod snapshot;
pub mod voting_power;

use valset_consensus::StakeConfig;
use valset_store::RocksStakeStore;

/// Open the snapshot database at `db`, or the configured data directory.
pub(crate) fn open_store(
    db: &Option<String>,
    config: &StakeConfig,
) -> Result<RocksStakeStore, Box<dyn std::error::Error>> {
    let path = match db {
        Some(path) => path.clone(),
        None => config.data_dir_path(),
    };
    tracing::debug!("Opening snapshot database at {}", path);
    Ok(RocksStakeStore::open_read_only(&path)?)
}
