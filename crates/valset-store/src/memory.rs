// crates/valset-store/src/memory.rs
//
// In-memory `StakeStore`. Holds a clone of the last inserted snapshot.

use std::sync::Mutex;

use valset_core::error::ValsetError;
use valset_core::stake_map::ValidatorSetState;
use valset_core::traits::StakeStore;

/// Mutex-guarded snapshot slot with the same contract as `RocksStakeStore`.
#[derive(Debug, Default)]
pub struct InMemoryStakeStore {
    state: Mutex<Option<ValidatorSetState>>,
}

impl InMemoryStakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a snapshot has been inserted.
    pub fn is_seeded(&self) -> bool {
        self.state.lock().map(|s| s.is_some()).unwrap_or(false)
    }
}

impl StakeStore for InMemoryStakeStore {
    fn insert_full_validator_set(&self, state: &ValidatorSetState) -> Result<(), ValsetError> {
        let mut slot = self
            .state
            .lock()
            .map_err(|e| ValsetError::Storage(format!("snapshot lock poisoned: {}", e)))?;
        *slot = Some(state.clone());
        Ok(())
    }

    fn get_full_validator_set(&self) -> Result<ValidatorSetState, ValsetError> {
        let slot = self
            .state
            .lock()
            .map_err(|e| ValsetError::Storage(format!("snapshot lock poisoned: {}", e)))?;
        slot.clone().ok_or(ValsetError::NoFullValidatorSet)
    }
}
