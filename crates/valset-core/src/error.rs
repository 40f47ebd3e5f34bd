// crates/valset-core/src/error.rs

use thiserror::Error;

use crate::types::Address;

/// Workspace-wide error type for validator-set and stake accounting.
#[derive(Debug, Error)]
pub enum ValsetError {
    /// Chain read failed (header lookup, receipts, state provider).
    #[error("Chain error: {0}")]
    Chain(String),

    /// An event log or contract response did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The full validator set has not been seeded yet.
    #[error("full validator set does not exist")]
    NoFullValidatorSet,

    /// A validator entering the active set has no resolvable BLS key.
    #[error("could not retrieve BLS key for validator {address}: {reason}")]
    MissingBlsKey { address: Address, reason: String },

    /// Storage layer error (RocksDB).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A delta could not be applied to the given account set.
    #[error("Invalid delta: {0}")]
    InvalidDelta(String),

    /// Invalid state transition or inconsistent bookkeeping.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),
}

impl ValsetError {
    /// True when the error only signals that the snapshot was never seeded.
    pub fn is_missing_snapshot(&self) -> bool {
        matches!(self, ValsetError::NoFullValidatorSet)
    }
}

impl From<serde_json::Error> for ValsetError {
    fn from(e: serde_json::Error) -> Self {
        ValsetError::Serialization(e.to_string())
    }
}

impl From<hex::FromHexError> for ValsetError {
    fn from(e: hex::FromHexError) -> Self {
        ValsetError::Decode(e.to_string())
    }
}
