// crates/valset-core/src/lib.rs
//
// valset-core: data model, error type, and collaborator traits for the
// epoch-based validator-set and stake-accounting subsystem.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the validator metadata, the full validator set snapshot, the
// active account set and its per-epoch delta, the exact voting-power formula,
// and quorum derivation.

pub mod bitmap;
pub mod crypto;
pub mod decimal;
pub mod error;
pub mod stake_map;
pub mod traits;
pub mod types;
pub mod validator;
pub mod voting_power;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use valset_core::ValidatorSetState;`

// Chain primitives
pub use types::{Address, BlsPublicKey, FullBlock, Hash, Header, Log, Receipt, ReceiptStatus};

// Validator set types
pub use bitmap::Bitmap;
pub use decimal::BigNumDecimal;
pub use stake_map::{ValidatorSetState, ValidatorStakeMap};
pub use validator::{quorum_size, AccountSet, ValidatorMetadata, ValidatorSet, ValidatorSetDelta};
pub use voting_power::{calculate_voting_power, WEI_PER_COIN};

// Error type
pub use error::ValsetError;

// Traits
pub use traits::{ChainBackend, StakeStore, StateProvider, SystemState};
