// crates/valset-consensus/src/lib.rs
//
// valset-consensus: stake tracking and validator-set updates.
//
// This crate turns finalized blocks into stake changes and epoch boundaries
// into validator-set deltas. It scans registry `StakeChanged` events, folds
// them into the persisted full validator set, ranks the next active set, and
// serializes all of it behind a single-writer handle.

pub mod actor;
pub mod config;
pub mod events;
pub mod stake_event;
pub mod stake_manager;

pub use actor::StakeManagerHandle;
pub use config::StakeConfig;
pub use events::{BlockEvents, EventScanner};
pub use stake_event::{encode_stake_changed, parse_stake_changed, StakeChangedEvent};
pub use stake_manager::{PostBlockRequest, PostEpochRequest, StakeHooks, StakeManager};
