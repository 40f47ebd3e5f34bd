// crates/valset-core/src/validator.rs
//
// Validator metadata, the ordered active account set, the per-epoch
// validator-set delta, and quorum derivation.
//
// Applying a delta:
//   1. drop entries whose index is set in `removed` (indices of the previous set)
//   2. append `added` (an address already present is an error)
//   3. replace `updated` entries in place by address (absent address is an error)

use std::collections::HashSet;
use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;
use crate::decimal::biguint_string;
use crate::error::ValsetError;
use crate::types::{Address, BlsPublicKey};

/// Total voting power below which every unit of power is required to sign.
pub const SMALL_SET_VOTING_POWER: u64 = 10;

/// Quorum fraction numerator (per mille): 61.4% of total voting power.
pub const QUORUM_PER_MILLE: u64 = 614;

/// One known validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorMetadata {
    pub address: Address,
    /// `None` until the key is observed in the registry contract.
    pub bls_key: Option<BlsPublicKey>,
    #[serde(with = "biguint_string")]
    pub voting_power: BigUint,
    /// Always equal to `voting_power > 0`.
    pub is_active: bool,
}

impl ValidatorMetadata {
    /// Build metadata with `is_active` derived from `voting_power`.
    pub fn new(address: Address, bls_key: Option<BlsPublicKey>, voting_power: BigUint) -> Self {
        let is_active = !voting_power.is_zero();
        Self {
            address,
            bls_key,
            voting_power,
            is_active,
        }
    }

    /// Replace the voting power and keep `is_active` in sync.
    pub fn set_voting_power(&mut self, voting_power: BigUint) {
        self.is_active = !voting_power.is_zero();
        self.voting_power = voting_power;
    }
}

impl fmt::Display for ValidatorMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Address={}; VotingPower={}; IsActive={}",
            self.address, self.voting_power, self.is_active
        )
    }
}

/// Ordered active validator set for one epoch.
///
/// Order matters for index-based removal in `ValidatorSetDelta`; it does not
/// itself encode ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountSet(pub Vec<ValidatorMetadata>);

impl AccountSet {
    pub fn new(accounts: Vec<ValidatorMetadata>) -> Self {
        Self(accounts)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidatorMetadata> {
        self.0.iter()
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.0.iter().map(|v| v.address).collect()
    }

    /// Position of `address`, if present.
    pub fn index_of(&self, address: &Address) -> Option<usize> {
        self.0.iter().position(|v| v.address == *address)
    }

    pub fn contains_address(&self, address: &Address) -> bool {
        self.index_of(address).is_some()
    }

    pub fn total_voting_power(&self) -> BigUint {
        self.0.iter().map(|v| &v.voting_power).sum()
    }

    /// Apply `delta` and return the resulting set; `self` is left untouched.
    ///
    /// # Errors
    /// Returns `ValsetError::InvalidDelta` when a removal index is outside
    /// this set, an added address is already present, or an updated address
    /// is missing.
    pub fn apply_delta(&self, delta: &ValidatorSetDelta) -> Result<AccountSet, ValsetError> {
        if delta.is_empty() {
            return Ok(self.clone());
        }

        if let Some(highest) = delta.removed.highest() {
            if highest >= self.len() {
                return Err(ValsetError::InvalidDelta(format!(
                    "removal index {} is out of range for a set of {} validators",
                    highest,
                    self.len()
                )));
            }
        }

        let mut validators: Vec<ValidatorMetadata> = self
            .0
            .iter()
            .enumerate()
            .filter(|(i, _)| !delta.removed.is_set(*i))
            .map(|(_, v)| v.clone())
            .collect();

        for added in delta.added.iter() {
            if validators.iter().any(|v| v.address == added.address) {
                return Err(ValsetError::InvalidDelta(format!(
                    "validator {} is already present in the validator set",
                    added.address
                )));
            }
            validators.push(added.clone());
        }

        for updated in delta.updated.iter() {
            let slot = validators
                .iter_mut()
                .find(|v| v.address == updated.address)
                .ok_or_else(|| {
                    ValsetError::InvalidDelta(format!(
                        "validator {} is marked as updated but not found in the validator set",
                        updated.address
                    ))
                })?;
            *slot = updated.clone();
        }

        Ok(AccountSet(validators))
    }
}

impl fmt::Display for AccountSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for v in &self.0 {
            writeln!(f, "{}", v)?;
        }
        Ok(())
    }
}

impl FromIterator<ValidatorMetadata> for AccountSet {
    fn from_iter<I: IntoIterator<Item = ValidatorMetadata>>(iter: I) -> Self {
        AccountSet(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a AccountSet {
    type Item = &'a ValidatorMetadata;
    type IntoIter = std::slice::Iter<'a, ValidatorMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Transformation from one epoch's active set to the next.
///
/// `removed` holds positions in the previous `AccountSet`; it is invalidated
/// by any reordering of that set between computation and application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSetDelta {
    pub added: AccountSet,
    pub updated: AccountSet,
    pub removed: Bitmap,
}

impl ValidatorSetDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

impl fmt::Display for ValidatorSetDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Added: {} Updated: {} Removed: {:?}",
            self.added.len(),
            self.updated.len(),
            self.removed.set_indices()
        )
    }
}

/// Minimum signer voting power required to finalize a block.
///
/// Small sets (`total < 10`) need every unit of voting power; otherwise the
/// quorum is the smallest integer strictly above 61.4% of the total.
pub fn quorum_size(total_voting_power: &BigUint) -> BigUint {
    if *total_voting_power < BigUint::from(SMALL_SET_VOTING_POWER) {
        return total_voting_power.clone();
    }
    total_voting_power * BigUint::from(QUORUM_PER_MILLE) / BigUint::from(1000u32)
        + BigUint::from(1u32)
}

/// An active account set with its cached total voting power and quorum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorSet {
    accounts: AccountSet,
    total_voting_power: BigUint,
    quorum_size: BigUint,
}

impl ValidatorSet {
    pub fn new(accounts: AccountSet) -> Self {
        let total_voting_power = accounts.total_voting_power();
        let quorum_size = quorum_size(&total_voting_power);
        Self {
            accounts,
            total_voting_power,
            quorum_size,
        }
    }

    pub fn accounts(&self) -> &AccountSet {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn total_voting_power(&self) -> &BigUint {
        &self.total_voting_power
    }

    pub fn quorum_size(&self) -> &BigUint {
        &self.quorum_size
    }

    /// Whether the voting power of `signers` that belong to this set reaches quorum.
    pub fn has_quorum(&self, signers: &HashSet<Address>) -> bool {
        let signed: BigUint = self
            .accounts
            .iter()
            .filter(|v| signers.contains(&v.address))
            .map(|v| &v.voting_power)
            .sum();
        signed >= self.quorum_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::from_slice(&[b])
    }

    fn meta(b: u8, vp: u64) -> ValidatorMetadata {
        ValidatorMetadata::new(addr(b), Some(BlsPublicKey(vec![b; 4])), BigUint::from(vp))
    }

    #[test]
    fn test_is_active_follows_voting_power() {
        let mut v = meta(1, 10);
        assert!(v.is_active);
        v.set_voting_power(BigUint::zero());
        assert!(!v.is_active);
        v.set_voting_power(BigUint::from(3u32));
        assert!(v.is_active);
    }

    #[test]
    fn test_quorum_size_table() {
        let cases: [(u64, u64); 11] = [
            (0, 0),
            (9, 9),
            (10, 7),
            (12, 8),
            (13, 8),
            (50, 31),
            (100, 62),
            (100_000, 61_401),
            (2_500_000, 1_535_001),
            (7_528_364_981, 4_622_416_099),
            (10_000_000_000, 6_140_000_001),
        ];
        for (total, expected) in cases {
            assert_eq!(
                quorum_size(&BigUint::from(total)),
                BigUint::from(expected),
                "total {}",
                total
            );
        }
    }

    #[test]
    fn test_has_quorum() {
        let set = ValidatorSet::new(AccountSet::new((1..=7).map(|b| meta(b, 1)).collect()));
        assert_eq!(set.quorum_size(), &BigUint::from(7u32));

        let set = ValidatorSet::new(AccountSet::new((1..=10).map(|b| meta(b, 10)).collect()));
        assert_eq!(set.total_voting_power(), &BigUint::from(100u32));

        let signers: HashSet<Address> = (1..=7).map(addr).collect();
        assert!(set.has_quorum(&signers));
        let signers: HashSet<Address> = (1..=6).map(addr).collect();
        assert!(!set.has_quorum(&signers));
        // Unknown signers contribute nothing.
        let signers: HashSet<Address> = (11..=30).map(addr).collect();
        assert!(!set.has_quorum(&signers));
    }

    #[test]
    fn test_apply_empty_delta_is_copy() {
        let set = AccountSet::new(vec![meta(1, 10), meta(2, 20)]);
        let out = set.apply_delta(&ValidatorSetDelta::default()).unwrap();
        assert_eq!(out, set);
    }

    #[test]
    fn test_apply_delta_remove_add_update() {
        let set = AccountSet::new(vec![meta(1, 10), meta(2, 20), meta(3, 30)]);
        let mut removed = Bitmap::new();
        removed.set(1);
        let delta = ValidatorSetDelta {
            added: AccountSet::new(vec![meta(4, 40)]),
            updated: AccountSet::new(vec![meta(3, 35)]),
            removed,
        };

        let out = set.apply_delta(&delta).unwrap();
        assert_eq!(out.addresses(), vec![addr(1), addr(3), addr(4)]);
        assert_eq!(out.0[1].voting_power, BigUint::from(35u32));
        // Input untouched.
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_apply_delta_rejects_duplicate_add() {
        let set = AccountSet::new(vec![meta(1, 10)]);
        let delta = ValidatorSetDelta {
            added: AccountSet::new(vec![meta(1, 10)]),
            ..Default::default()
        };
        assert!(matches!(set.apply_delta(&delta), Err(ValsetError::InvalidDelta(_))));
    }

    #[test]
    fn test_apply_delta_readd_after_remove() {
        let set = AccountSet::new(vec![meta(1, 10)]);
        let mut removed = Bitmap::new();
        removed.set(0);
        let delta = ValidatorSetDelta {
            added: AccountSet::new(vec![meta(1, 12)]),
            updated: AccountSet::default(),
            removed,
        };
        let out = set.apply_delta(&delta).unwrap();
        assert_eq!(out.0, vec![meta(1, 12)]);
    }

    #[test]
    fn test_apply_delta_rejects_unknown_update() {
        let set = AccountSet::new(vec![meta(1, 10)]);
        let delta = ValidatorSetDelta {
            updated: AccountSet::new(vec![meta(9, 10)]),
            ..Default::default()
        };
        assert!(matches!(set.apply_delta(&delta), Err(ValsetError::InvalidDelta(_))));
    }

    #[test]
    fn test_apply_delta_rejects_out_of_range_removal() {
        let set = AccountSet::new(vec![meta(1, 10)]);
        let mut removed = Bitmap::new();
        removed.set(3);
        let delta = ValidatorSetDelta {
            removed,
            ..Default::default()
        };
        assert!(matches!(set.apply_delta(&delta), Err(ValsetError::InvalidDelta(_))));
    }

    #[test]
    fn test_total_voting_power() {
        let set = AccountSet::new(vec![meta(1, 10), meta(2, 20), meta(3, 0)]);
        assert_eq!(set.total_voting_power(), BigUint::from(30u32));
    }
}
