// crates/valset-store/src/rocks.rs
//
// RocksDB-backed persistent storage for the full validator set.
//
// Key format:
//   - `valset:full_validator_set` -> JSON-serialized ValidatorSetState
//
// The snapshot is small (one entry per validator) and always rewritten as a
// whole, so a single key is enough and every put is atomic.

use rocksdb::{DBWithThreadMode, MultiThreaded, Options};
use tracing::debug;

use valset_core::error::ValsetError;
use valset_core::stake_map::ValidatorSetState;
use valset_core::traits::StakeStore;

/// Key under which the snapshot is stored.
pub const FULL_VALIDATOR_SET_KEY: &[u8] = b"valset:full_validator_set";

/// RocksDB wrapper implementing the `StakeStore` trait.
#[derive(Debug)]
pub struct RocksStakeStore {
    db: DBWithThreadMode<MultiThreaded>,
}

impl RocksStakeStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, ValsetError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path).map_err(|e| {
            ValsetError::Storage(format!("Failed to open RocksDB at {}: {}", path, e))
        })?;

        Ok(Self { db })
    }

    /// Open an existing database read-only.
    ///
    /// Does not take the database lock, so a running node's store can be
    /// inspected. A missing path is an error, and writes through the handle fail.
    pub fn open_read_only(path: &str) -> Result<Self, ValsetError> {
        let opts = Options::default();
        let db = DBWithThreadMode::<MultiThreaded>::open_for_read_only(&opts, path, false)
            .map_err(|e| {
                ValsetError::Storage(format!(
                    "Failed to open RocksDB read-only at {}: {}",
                    path, e
                ))
            })?;
        Ok(Self { db })
    }

    /// Put raw bytes into RocksDB, mapping errors to ValsetError::Storage.
    fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), ValsetError> {
        self.db
            .put(key, value)
            .map_err(|e| ValsetError::Storage(format!("RocksDB put failed: {}", e)))
    }

    /// Get raw bytes from RocksDB, mapping errors to ValsetError::Storage.
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ValsetError> {
        self.db
            .get(key)
            .map_err(|e| ValsetError::Storage(format!("RocksDB get failed: {}", e)))
    }
}

impl StakeStore for RocksStakeStore {
    fn insert_full_validator_set(&self, state: &ValidatorSetState) -> Result<(), ValsetError> {
        let json = serde_json::to_vec(state)?;
        self.put_raw(FULL_VALIDATOR_SET_KEY, &json)?;
        debug!(
            block = state.block_number,
            epoch = state.epoch_id,
            validators = state.validators.len(),
            "persisted full validator set"
        );
        Ok(())
    }

    fn get_full_validator_set(&self) -> Result<ValidatorSetState, ValsetError> {
        match self.get_raw(FULL_VALIDATOR_SET_KEY)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Err(ValsetError::NoFullValidatorSet),
        }
    }
}
