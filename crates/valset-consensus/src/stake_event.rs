// crates/valset-consensus/src/stake_event.rs
//
// `StakeChanged(address indexed validator, uint256 newStake)` log decoding.
//
// Log layout:
//   topics[0] = keccak256("StakeChanged(address,uint256)")
//   topics[1] = validator address, left-padded to 32 bytes
//   data      = new stake, 32-byte big-endian uint256
//
// The stake is absolute, not a delta, so replaying the same event twice is
// harmless.

use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use valset_core::error::ValsetError;
use valset_core::types::{Address, Hash, Log, ADDRESS_LENGTH, HASH_LENGTH};

/// Canonical event signature.
pub const STAKE_CHANGED_SIGNATURE: &str = "StakeChanged(address,uint256)";

/// A decoded stake change for one validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeChangedEvent {
    pub validator: Address,
    #[serde(with = "valset_core::decimal::biguint_string")]
    pub new_stake: BigUint,
}

impl fmt::Display for StakeChangedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StakeChanged({}, {})", self.validator, self.new_stake)
    }
}

/// Keccak-256 of the event signature (`topics[0]`).
pub fn stake_changed_topic() -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(STAKE_CHANGED_SIGNATURE.as_bytes());
    Hash::from_slice(&hasher.finalize())
}

/// Decode `log` as a `StakeChanged` event.
///
/// Returns `Ok(None)` when the log carries a different event signature.
/// A log with the right signature but the wrong shape is a decode error.
pub fn parse_stake_changed(log: &Log) -> Result<Option<StakeChangedEvent>, ValsetError> {
    match log.topics.first() {
        Some(topic) if *topic == stake_changed_topic() => {}
        _ => return Ok(None),
    }

    if log.topics.len() != 2 {
        return Err(ValsetError::Decode(format!(
            "StakeChanged log expects 2 topics, got {}",
            log.topics.len()
        )));
    }

    let word = log.topics[1].as_bytes();
    let padding = HASH_LENGTH - ADDRESS_LENGTH;
    if word[..padding].iter().any(|b| *b != 0) {
        return Err(ValsetError::Decode(format!(
            "StakeChanged validator topic is not a padded address: {}",
            log.topics[1]
        )));
    }

    if log.data.len() != HASH_LENGTH {
        return Err(ValsetError::Decode(format!(
            "StakeChanged data must be {} bytes, got {}",
            HASH_LENGTH,
            log.data.len()
        )));
    }

    Ok(Some(StakeChangedEvent {
        validator: Address::from_slice(&word[padding..]),
        new_stake: BigUint::from_bytes_be(&log.data),
    }))
}

/// Build the log the registry at `contract` emits for `event`.
///
/// Fails if the stake does not fit in a uint256.
pub fn encode_stake_changed(
    contract: Address,
    event: &StakeChangedEvent,
) -> Result<Log, ValsetError> {
    let stake = event.new_stake.to_bytes_be();
    if stake.len() > HASH_LENGTH {
        return Err(ValsetError::Decode(format!(
            "stake {} does not fit in uint256",
            event.new_stake
        )));
    }
    let mut data = vec![0u8; HASH_LENGTH - stake.len()];
    data.extend_from_slice(&stake);

    Ok(Log {
        address: contract,
        topics: vec![
            stake_changed_topic(),
            Hash::from_slice(event.validator.as_bytes()),
        ],
        data,
    })
}
