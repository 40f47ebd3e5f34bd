// crates/valset-core/src/stake_map.rs
//
// The full validator set: every validator ever observed in the registry,
// active or not, keyed by address. `ValidatorSetState` wraps it with the
// bookkeeping persisted by the store.
//
// The map is ordered by address so iteration, serialization, and ranking ties
// are identical on every node.

use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::crypto::hash_bytes;
use crate::decimal::BigNumDecimal;
use crate::error::ValsetError;
use crate::types::{Address, BlsPublicKey};
use crate::validator::{AccountSet, ValidatorMetadata};
use crate::voting_power::calculate_voting_power;

/// Address-keyed map of all known validators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatorStakeMap(BTreeMap<Address, ValidatorMetadata>);

impl ValidatorStakeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a map from an active set (used for the genesis snapshot).
    /// `is_active` is recomputed from each entry's voting power.
    pub fn from_account_set(accounts: &AccountSet) -> Self {
        let map = accounts
            .iter()
            .map(|v| {
                let mut v = v.clone();
                v.is_active = !v.voting_power.is_zero();
                (v.address, v)
            })
            .collect::<BTreeMap<_, _>>();
        Self(map)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, address: &Address) -> Option<&ValidatorMetadata> {
        self.0.get(address)
    }

    pub fn insert(&mut self, metadata: ValidatorMetadata) {
        self.0.insert(metadata.address, metadata);
    }

    /// Iterate in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = &ValidatorMetadata> {
        self.0.values()
    }

    /// Record a new absolute stake for `address`, recomputing its voting power.
    ///
    /// Unknown addresses are inserted without a BLS key; the key is resolved
    /// later from the registry.
    pub fn set_stake(
        &mut self,
        address: Address,
        staked_balance: &BigUint,
        exponent: &BigNumDecimal,
    ) -> Result<(), ValsetError> {
        let voting_power = calculate_voting_power(staked_balance, exponent)?;
        match self.0.get_mut(&address) {
            Some(existing) => existing.set_voting_power(voting_power),
            None => {
                self.0
                    .insert(address, ValidatorMetadata::new(address, None, voting_power));
            }
        }
        Ok(())
    }

    /// Attach a BLS key to a known validator. Returns false for unknown addresses.
    pub fn set_bls_key(&mut self, address: &Address, key: BlsPublicKey) -> bool {
        match self.0.get_mut(address) {
            Some(v) => {
                v.bls_key = Some(key);
                true
            }
            None => false,
        }
    }

    /// Addresses of validators still missing a BLS key, in address order.
    pub fn missing_bls_keys(&self) -> Vec<Address> {
        self.0
            .values()
            .filter(|v| v.bls_key.is_none())
            .map(|v| v.address)
            .collect()
    }

    /// Validators with non-zero voting power ranked by voting power
    /// (descending, ties by ascending address), truncated to `max_size`.
    pub fn get_sorted(&self, max_size: usize) -> AccountSet {
        let mut active: Vec<ValidatorMetadata> = self
            .0
            .values()
            .filter(|v| !v.voting_power.is_zero())
            .cloned()
            .collect();
        // Stable sort over address-ordered input keeps ties by address.
        active.sort_by(|a, b| b.voting_power.cmp(&a.voting_power));
        active.truncate(max_size);
        AccountSet::new(active)
    }
}

impl fmt::Display for ValidatorStakeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for v in self.0.values() {
            writeln!(f, "{}", v)?;
        }
        Ok(())
    }
}

/// Persisted snapshot of the full validator set plus bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSetState {
    /// Last block whose events have been folded in.
    #[serde(rename = "block")]
    pub block_number: u64,
    /// Epoch of `block_number`.
    #[serde(rename = "epoch")]
    pub epoch_id: u64,
    /// Last block that actually carried stake events.
    #[serde(rename = "updated_at_block")]
    pub updated_at_block_number: u64,
    pub validators: ValidatorStakeMap,
}

impl ValidatorSetState {
    /// Genesis snapshot: the given active set with zeroed bookkeeping.
    pub fn genesis(accounts: &AccountSet) -> Self {
        Self {
            block_number: 0,
            epoch_id: 0,
            updated_at_block_number: 0,
            validators: ValidatorStakeMap::from_account_set(accounts),
        }
    }

    /// SHA-256 over the canonical JSON encoding, hex encoded.
    pub fn digest(&self) -> Result<String, ValsetError> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(hash_bytes(&bytes)))
    }
}

impl fmt::Display for ValidatorSetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block: {}; Epoch: {}; UpdatedAt: {}; Validators: {}",
            self.block_number,
            self.epoch_id,
            self.updated_at_block_number,
            self.validators.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::from_slice(&[b])
    }

    fn coins(n: u64) -> BigUint {
        BigUint::from(n) * BigUint::from(crate::voting_power::WEI_PER_COIN)
    }

    fn unit_exp() -> BigNumDecimal {
        BigNumDecimal::new(1u32, 1u32)
    }

    #[test]
    fn test_set_stake_inserts_and_updates() {
        let mut map = ValidatorStakeMap::new();
        map.set_stake(addr(1), &coins(10), &unit_exp()).unwrap();
        let v = map.get(&addr(1)).unwrap();
        assert_eq!(v.voting_power, BigUint::from(10u32));
        assert!(v.is_active);
        assert!(v.bls_key.is_none());

        map.set_stake(addr(1), &BigUint::from(5u32), &unit_exp()).unwrap();
        let v = map.get(&addr(1)).unwrap();
        assert_eq!(v.voting_power, BigUint::from(0u32));
        assert!(!v.is_active);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_set_stake_keeps_bls_key() {
        let mut map = ValidatorStakeMap::new();
        map.insert(ValidatorMetadata::new(
            addr(2),
            Some(BlsPublicKey(vec![1, 2, 3])),
            BigUint::from(1u32),
        ));
        map.set_stake(addr(2), &coins(7), &unit_exp()).unwrap();
        assert_eq!(map.get(&addr(2)).unwrap().bls_key, Some(BlsPublicKey(vec![1, 2, 3])));
        assert!(map.missing_bls_keys().is_empty());
    }

    #[test]
    fn test_get_sorted_ranks_and_breaks_ties_by_address() {
        let mut map = ValidatorStakeMap::new();
        map.set_stake(addr(5), &coins(10), &unit_exp()).unwrap();
        map.set_stake(addr(3), &coins(10), &unit_exp()).unwrap();
        map.set_stake(addr(9), &coins(30), &unit_exp()).unwrap();
        map.set_stake(addr(1), &coins(0), &unit_exp()).unwrap();
        map.set_stake(addr(7), &coins(20), &unit_exp()).unwrap();

        let sorted = map.get_sorted(10);
        assert_eq!(sorted.addresses(), vec![addr(9), addr(7), addr(3), addr(5)]);

        let top = map.get_sorted(2);
        assert_eq!(top.addresses(), vec![addr(9), addr(7)]);
        assert!(map.get_sorted(0).is_empty());
    }

    #[test]
    fn test_get_sorted_ranks_by_voting_power_not_flag() {
        let mut stale = ValidatorMetadata::new(addr(4), None, BigUint::from(0u32));
        stale.is_active = true;
        let mut flagged_off = ValidatorMetadata::new(addr(2), None, BigUint::from(8u32));
        flagged_off.is_active = false;

        let mut map = ValidatorStakeMap::new();
        map.insert(stale.clone());
        map.insert(flagged_off.clone());
        assert_eq!(map.get_sorted(10).addresses(), vec![addr(2)]);

        let seeded = ValidatorStakeMap::from_account_set(&AccountSet::new(vec![stale, flagged_off]));
        assert!(!seeded.get(&addr(4)).unwrap().is_active);
        assert!(seeded.get(&addr(2)).unwrap().is_active);
        assert_eq!(seeded.get_sorted(10).addresses(), vec![addr(2)]);
    }

    #[test]
    fn test_get_sorted_is_insertion_order_independent() {
        let mut a = ValidatorStakeMap::new();
        let mut b = ValidatorStakeMap::new();
        for i in 1..=20u8 {
            a.set_stake(addr(i), &coins(u64::from(i % 4)), &unit_exp()).unwrap();
        }
        for i in (1..=20u8).rev() {
            b.set_stake(addr(i), &coins(u64::from(i % 4)), &unit_exp()).unwrap();
        }
        assert_eq!(a.get_sorted(100), b.get_sorted(100));
        assert_eq!(a, b);
    }

    #[test]
    fn test_state_json_field_names() {
        let mut state = ValidatorSetState::default();
        state.block_number = 12;
        state.epoch_id = 2;
        state.updated_at_block_number = 11;
        state.validators.set_stake(addr(1), &coins(3), &unit_exp()).unwrap();

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["block"], 12);
        assert_eq!(value["epoch"], 2);
        assert_eq!(value["updated_at_block"], 11);
        let key = addr(1).to_string();
        assert_eq!(value["validators"][key.as_str()]["voting_power"], "3");

        let back: ValidatorSetState = serde_json::from_value(value).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_digest_is_stable_and_sensitive() {
        let accounts = AccountSet::new(vec![ValidatorMetadata::new(
            addr(1),
            None,
            BigUint::from(4u32),
        )]);
        let a = ValidatorSetState::genesis(&accounts);
        let b = ValidatorSetState::genesis(&accounts);
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
        assert_eq!(a.digest().unwrap().len(), 64);

        let mut c = b.clone();
        c.block_number = 1;
        assert_ne!(a.digest().unwrap(), c.digest().unwrap());
    }
}
