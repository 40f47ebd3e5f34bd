// crates/valset-consensus/src/stake_manager.rs
//
// Stake manager: folds `StakeChanged` events from finalized blocks into the
// persisted full validator set, and derives the active-set delta at each
// epoch boundary.
//
// Lifecycle:
//   init                -> catch up from the stored snapshot to the chain head
//   post_epoch(1)       -> seed the snapshot from the genesis active set
//   post_block(b)       -> scan b (and any skipped blocks), fold, persist
//   update_validator_set -> rank top-N and diff against the previous active set
//
// A fold works on an owned copy of the snapshot and is persisted in one
// write, so a failed fold leaves the stored snapshot untouched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn, Level};

use valset_core::error::ValsetError;
use valset_core::stake_map::ValidatorSetState;
use valset_core::traits::{ChainBackend, StakeStore, SystemState};
use valset_core::types::{Address, BlsPublicKey, FullBlock, Header, Log};
use valset_core::validator::{AccountSet, ValidatorSet, ValidatorSetDelta};
use valset_core::Bitmap;

use crate::config::StakeConfig;
use crate::events::{BlockEvents, EventScanner};
use crate::stake_event::{parse_stake_changed, StakeChangedEvent};

/// A finalized block handed to the stake manager.
#[derive(Debug, Clone)]
pub struct PostBlockRequest {
    pub full_block: FullBlock,
    /// Epoch the block belongs to.
    pub epoch: u64,
}

/// Notification that a new epoch has started.
#[derive(Debug, Clone)]
pub struct PostEpochRequest {
    pub new_epoch_id: u64,
    /// Active validator set of the new epoch.
    pub validator_set: ValidatorSet,
}

/// Hooks consensus drives on block finalization and epoch transitions.
pub trait StakeHooks: Send {
    /// Fold the stake events of a finalized block.
    fn post_block(&mut self, req: &PostBlockRequest) -> Result<(), ValsetError>;

    /// React to an epoch start.
    fn post_epoch(&mut self, req: &PostEpochRequest) -> Result<(), ValsetError>;

    /// Delta turning `previous` into the next epoch's active set.
    fn update_validator_set(
        &mut self,
        epoch: u64,
        previous: &AccountSet,
    ) -> Result<ValidatorSetDelta, ValsetError>;
}

/// Tracks validator stake from registry events and computes set updates.
pub struct StakeManager {
    chain: Arc<dyn ChainBackend>,
    store: Arc<dyn StakeStore>,
    scanner: EventScanner<StakeChangedEvent>,
    max_validator_set_size: usize,
}

impl StakeManager {
    /// Build a stake manager and catch up with the chain head.
    ///
    /// # Errors
    /// Propagates configuration, chain, and store errors from `init`.
    pub fn new(
        chain: Arc<dyn ChainBackend>,
        store: Arc<dyn StakeStore>,
        config: &StakeConfig,
    ) -> Result<Self, ValsetError> {
        config.validate()?;

        let registry = config.validator_set_address;
        let scanner = EventScanner::new(
            Arc::clone(&chain),
            Box::new(move |log: &Log| log.address == registry),
            Box::new(|_header: &Header, log: &Log| parse_stake_changed(log)),
        );

        let mut manager = Self {
            chain,
            store,
            scanner,
            max_validator_set_size: config.max_validator_set_size,
        };
        manager.init()?;
        Ok(manager)
    }

    /// Bring the stored snapshot up to the current chain head.
    ///
    /// No-op at genesis or when the snapshot already covers the head.
    pub fn init(&mut self) -> Result<(), ValsetError> {
        let head = self.chain.current_header()?;
        if head.number == 0 {
            return Ok(());
        }

        let mut state = self.store.get_full_validator_set()?;
        if state.block_number == head.number {
            return Ok(());
        }
        if state.block_number > head.number {
            return Err(ValsetError::InvalidState(format!(
                "stored validator set is at block {} but chain head is {}",
                state.block_number, head.number
            )));
        }

        let epoch = self.system_state_for(&head)?.epoch()?;

        debug!(
            block = head.number,
            last_saved = state.block_number,
            last_updated = state.updated_at_block_number,
            "stake manager catching up"
        );

        let events = self
            .scanner
            .get_events_from_all_blocks(state.block_number + 1, head.number)?;
        self.fold(&mut state, &events)?;

        state.epoch_id = epoch;
        state.block_number = head.number;
        self.store.insert_full_validator_set(&state)
    }

    /// Apply `events` to `state` in block order. Each block's events use the
    /// voting-power exponent in force at that block.
    fn fold(
        &self,
        state: &mut ValidatorSetState,
        events: &[BlockEvents<StakeChangedEvent>],
    ) -> Result<(), ValsetError> {
        let last_block = match events.last() {
            Some(last) => last.block_number(),
            None => return Ok(()),
        };

        for block in events {
            let exponent = self
                .system_state_for(&block.header)?
                .voting_power_exponent()?;

            for event in &block.events {
                debug!(
                    block = block.block_number(),
                    validator = %event.validator,
                    new_stake = %event.new_stake,
                    exponent = %exponent,
                    "StakeChanged event"
                );
                state
                    .validators
                    .set_stake(event.validator, &event.new_stake, &exponent)?;
            }
        }

        self.resolve_missing_bls_keys(state, last_block);
        state.updated_at_block_number = last_block;

        debug!(block = last_block, validators = %state.validators, "full validator set after fold");
        Ok(())
    }

    /// Fill in BLS keys not yet known. Failures are deferred to a later fold.
    fn resolve_missing_bls_keys(&self, state: &mut ValidatorSetState, block: u64) {
        let missing = state.validators.missing_bls_keys();
        if missing.is_empty() {
            return;
        }

        let system_state = match self.head_system_state() {
            Ok(s) => s,
            Err(e) => {
                warn!(block, missing = missing.len(), error = %e, "could not open system state for BLS keys");
                return;
            }
        };

        for address in missing {
            match system_state.validator_bls_key(&address) {
                Ok(key) => {
                    state.validators.set_bls_key(&address, key);
                }
                Err(e) => {
                    warn!(block, address = %address, error = %e, "could not get info for new validator");
                }
            }
        }
    }

    /// BLS key of `address` as registered at the chain head.
    fn bls_key(&self, address: &Address) -> Result<BlsPublicKey, ValsetError> {
        self.head_system_state()?.validator_bls_key(address)
    }

    fn head_system_state(&self) -> Result<Box<dyn SystemState>, ValsetError> {
        let head = self.chain.current_header()?;
        self.system_state_for(&head)
    }

    fn system_state_for(&self, header: &Header) -> Result<Box<dyn SystemState>, ValsetError> {
        let provider = self.chain.state_provider_for_block(header)?;
        self.chain.system_state(provider)
    }
}

impl StakeHooks for StakeManager {
    fn post_epoch(&mut self, req: &PostEpochRequest) -> Result<(), ValsetError> {
        if req.new_epoch_id != 1 {
            return Ok(());
        }

        info!(
            validators = req.validator_set.len(),
            "seeding full validator set from genesis"
        );
        self.store
            .insert_full_validator_set(&ValidatorSetState::genesis(req.validator_set.accounts()))
    }

    fn post_block(&mut self, req: &PostBlockRequest) -> Result<(), ValsetError> {
        let mut state = self.store.get_full_validator_set()?;
        let header = &req.full_block.header;

        debug!(
            block = header.number,
            last_saved = state.block_number,
            last_updated = state.updated_at_block_number,
            "stake manager on post block"
        );

        if header.number <= state.block_number {
            debug!(block = header.number, "block already processed");
            return Ok(());
        }

        let events = self
            .scanner
            .get_from_blocks(state.block_number, &req.full_block)?;
        self.fold(&mut state, &events)?;

        // Persist even without events so the next block does not rescan this one.
        state.epoch_id = req.epoch;
        state.block_number = header.number;
        self.store.insert_full_validator_set(&state)
    }

    fn update_validator_set(
        &mut self,
        epoch: u64,
        previous: &AccountSet,
    ) -> Result<ValidatorSetDelta, ValsetError> {
        info!(epoch, "calculating validator set update");

        let state = self.store.get_full_validator_set()?;
        let ranked = state.validators.get_sorted(self.max_validator_set_size);
        let next: HashSet<Address> = ranked.iter().map(|v| v.address).collect();

        let mut removed = Bitmap::new();
        let mut old_active = HashMap::with_capacity(previous.len());
        for (i, v) in previous.iter().enumerate() {
            old_active.insert(v.address, v);
            if !next.contains(&v.address) {
                removed.set(i);
            }
        }

        let mut added = Vec::new();
        let mut updated = Vec::new();
        for mut candidate in ranked.0 {
            match old_active.get(&candidate.address) {
                Some(old) => {
                    if old.voting_power != candidate.voting_power {
                        // An updated entry replaces the active one; keep its key.
                        if candidate.bls_key.is_none() {
                            candidate.bls_key = old.bls_key.clone();
                        }
                        updated.push(candidate);
                    }
                }
                None => {
                    if candidate.bls_key.is_none() {
                        let key = self.bls_key(&candidate.address).map_err(|e| {
                            ValsetError::MissingBlsKey {
                                address: candidate.address,
                                reason: e.to_string(),
                            }
                        })?;
                        candidate.bls_key = Some(key);
                    }
                    added.push(candidate);
                }
            }
        }

        info!(
            epoch,
            added = added.len(),
            updated = updated.len(),
            removed = removed.count(),
            "calculating validator set update finished"
        );

        let delta = ValidatorSetDelta {
            added: AccountSet::new(added),
            updated: AccountSet::new(updated),
            removed,
        };

        if tracing::enabled!(Level::DEBUG) {
            let next_set = previous.apply_delta(&delta)?;
            debug!(epoch, validator_set = %next_set, "new validator set");
        }

        Ok(delta)
    }
}

/// Hooks that accept everything and change nothing.
#[cfg(test)]
pub(crate) struct NoopStakeManager;

#[cfg(test)]
impl StakeHooks for NoopStakeManager {
    fn post_block(&mut self, _req: &PostBlockRequest) -> Result<(), ValsetError> {
        Ok(())
    }

    fn post_epoch(&mut self, _req: &PostEpochRequest) -> Result<(), ValsetError> {
        Ok(())
    }

    fn update_validator_set(
        &mut self,
        _epoch: u64,
        _previous: &AccountSet,
    ) -> Result<ValidatorSetDelta, ValsetError> {
        Ok(ValidatorSetDelta::default())
    }
}
