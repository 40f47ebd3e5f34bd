// crates/valset-core/src/traits.rs
//
// Collaborator interfaces. The execution engine, the registry contract view,
// and the snapshot store are all external to this workspace; the stake core
// only sees them through these traits.

use num_bigint::BigUint;

use crate::decimal::BigNumDecimal;
use crate::error::ValsetError;
use crate::stake_map::ValidatorSetState;
use crate::types::{Address, BlsPublicKey, Hash, Header, Receipt};

/// Read access to the canonical chain.
///
/// Implemented by the node's blockchain backend.
pub trait ChainBackend: Send + Sync {
    /// Header of the current chain head.
    fn current_header(&self) -> Result<Header, ValsetError>;

    /// Canonical header at `number`, or `None` if the chain has no such block.
    fn header_by_number(&self, number: u64) -> Result<Option<Header>, ValsetError>;

    /// Receipts of the block with the given hash, in transaction order.
    fn receipts_by_hash(&self, hash: &Hash) -> Result<Vec<Receipt>, ValsetError>;

    /// State view as of the end of block `header`.
    fn state_provider_for_block(&self, header: &Header)
        -> Result<Box<dyn StateProvider>, ValsetError>;

    /// Registry accessor bound to `provider`.
    fn system_state(
        &self,
        provider: Box<dyn StateProvider>,
    ) -> Result<Box<dyn SystemState>, ValsetError>;
}

/// Opaque state view at a particular block.
pub trait StateProvider: Send + Sync {
    /// Block the view was opened at.
    fn block_number(&self) -> u64;
}

/// Read-only view of the on-chain validator registry and reward parameters.
pub trait SystemState: Send + Sync {
    /// Epoch id recorded in chain state.
    fn epoch(&self) -> Result<u64, ValsetError>;

    /// Exponent applied to whole-coin stake to obtain voting power.
    fn voting_power_exponent(&self) -> Result<BigNumDecimal, ValsetError>;

    /// Registered BLS public key of `address`.
    fn validator_bls_key(&self, address: &Address) -> Result<BlsPublicKey, ValsetError>;

    /// Base reward rate; the numerator is scaled by 10000.
    fn base_reward(&self) -> Result<BigNumDecimal, ValsetError>;

    /// Total stake locked in the registry, 18-decimal units.
    fn staked_balance(&self) -> Result<BigUint, ValsetError>;

    /// Macro-economic factor, scaled by 10000.
    fn macro_factor(&self) -> Result<BigUint, ValsetError>;

    /// Maximum relative strength index, scaled by 10000.
    fn max_rsi(&self) -> Result<BigUint, ValsetError>;
}

/// Durable storage for the full validator set snapshot.
///
/// Implemented by valset-store (RocksDB and in-memory backends).
pub trait StakeStore: Send + Sync {
    /// Persist `state`, replacing any previous snapshot atomically.
    fn insert_full_validator_set(&self, state: &ValidatorSetState) -> Result<(), ValsetError>;

    /// Load the snapshot. Returns `ValsetError::NoFullValidatorSet` if none was stored.
    fn get_full_validator_set(&self) -> Result<ValidatorSetState, ValsetError>;
}
