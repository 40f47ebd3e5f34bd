// crates/valset-store/src/lib.rs
//
// valset-store: Storage layer for the full validator set snapshot.
//
// Provides a RocksDB-backed `StakeStore` for nodes and an in-memory one for
// tests and embedders. Both store the whole `ValidatorSetState` as a single
// record, so a write either lands completely or not at all.

pub mod memory;
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::InMemoryStakeStore;
pub use rocks::RocksStakeStore;
