// crates/valset-consensus/tests/common/mod.rs
//
// In-memory chain and registry fakes shared by the stake manager tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use num_bigint::BigUint;

use valset_consensus::stake_event::{encode_stake_changed, StakeChangedEvent};
use valset_consensus::StakeConfig;
use valset_core::decimal::BigNumDecimal;
use valset_core::error::ValsetError;
use valset_core::traits::{ChainBackend, StateProvider, SystemState};
use valset_core::types::{Address, BlsPublicKey, FullBlock, Hash, Header, Log, Receipt};
use valset_core::validator::{AccountSet, ValidatorMetadata, ValidatorSet};
use valset_core::WEI_PER_COIN;

/// Registry contract address used by every test.
pub fn registry_address() -> Address {
    StakeConfig::default().validator_set_address
}

pub fn addr(b: u8) -> Address {
    Address::from_slice(&[b])
}

pub fn bls(b: u8) -> BlsPublicKey {
    BlsPublicKey(vec![b; 48])
}

/// `n` whole coins in 18-decimal units.
pub fn coins(n: u64) -> BigUint {
    BigUint::from(n) * BigUint::from(WEI_PER_COIN)
}

pub fn header(number: u64) -> Header {
    Header {
        number,
        hash: Hash::from_slice(&number.to_be_bytes()),
    }
}

/// `StakeChanged` log from the registry.
pub fn stake_log(validator: Address, stake: BigUint) -> Log {
    encode_stake_changed(
        registry_address(),
        &StakeChangedEvent {
            validator,
            new_stake: stake,
        },
    )
    .unwrap()
}

/// Genesis active set: validators 1..=n, `power` voting power each, keys known.
pub fn genesis_set(n: u8, power: u64) -> ValidatorSet {
    ValidatorSet::new(AccountSet::new(
        (1..=n)
            .map(|b| ValidatorMetadata::new(addr(b), Some(bls(b)), BigUint::from(power)))
            .collect(),
    ))
}

/// Mutable registry state read through `MockSystemState`.
pub struct MockRegistry {
    pub exponent: Mutex<BigNumDecimal>,
    /// Exponent overrides in force from a block number onward.
    pub exponent_from: Mutex<BTreeMap<u64, BigNumDecimal>>,
    pub bls_keys: Mutex<HashMap<Address, BlsPublicKey>>,
    /// Addresses whose key lookup fails.
    pub bls_failures: Mutex<HashSet<Address>>,
    pub epoch: Mutex<u64>,
    pub staked_balance: Mutex<BigUint>,
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self {
            exponent: Mutex::new(BigNumDecimal::new(1u32, 1u32)),
            exponent_from: Mutex::new(BTreeMap::new()),
            bls_keys: Mutex::new(HashMap::new()),
            bls_failures: Mutex::new(HashSet::new()),
            epoch: Mutex::new(1),
            staked_balance: Mutex::new(BigUint::from(0u32)),
        }
    }
}

impl MockRegistry {
    pub fn register_key(&self, address: Address, key: BlsPublicKey) {
        self.bls_keys.lock().unwrap().insert(address, key);
    }

    pub fn fail_key(&self, address: Address) {
        self.bls_failures.lock().unwrap().insert(address);
    }

    pub fn clear_failures(&self) {
        self.bls_failures.lock().unwrap().clear();
    }

    pub fn set_epoch(&self, epoch: u64) {
        *self.epoch.lock().unwrap() = epoch;
    }

    pub fn set_exponent(&self, exponent: BigNumDecimal) {
        *self.exponent.lock().unwrap() = exponent;
    }

    /// Change the exponent for state at `block` and every later block.
    pub fn set_exponent_from(&self, block: u64, exponent: BigNumDecimal) {
        self.exponent_from.lock().unwrap().insert(block, exponent);
    }

    fn exponent_at(&self, block: u64) -> BigNumDecimal {
        match self.exponent_from.lock().unwrap().range(..=block).next_back() {
            Some((_, exponent)) => exponent.clone(),
            None => self.exponent.lock().unwrap().clone(),
        }
    }
}

pub struct MockProvider {
    number: u64,
}

impl StateProvider for MockProvider {
    fn block_number(&self) -> u64 {
        self.number
    }
}

pub struct MockSystemState {
    registry: Arc<MockRegistry>,
    block: u64,
}

impl SystemState for MockSystemState {
    fn epoch(&self) -> Result<u64, ValsetError> {
        Ok(*self.registry.epoch.lock().unwrap())
    }

    fn voting_power_exponent(&self) -> Result<BigNumDecimal, ValsetError> {
        Ok(self.registry.exponent_at(self.block))
    }

    fn validator_bls_key(&self, address: &Address) -> Result<BlsPublicKey, ValsetError> {
        if self.registry.bls_failures.lock().unwrap().contains(address) {
            return Err(ValsetError::Chain(format!("registry call failed for {}", address)));
        }
        self.registry
            .bls_keys
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| ValsetError::Chain(format!("no key registered for {}", address)))
    }

    fn base_reward(&self) -> Result<BigNumDecimal, ValsetError> {
        Ok(BigNumDecimal::new(500u32, 10000u32))
    }

    fn staked_balance(&self) -> Result<BigUint, ValsetError> {
        Ok(self.registry.staked_balance.lock().unwrap().clone())
    }

    fn macro_factor(&self) -> Result<BigUint, ValsetError> {
        Ok(BigUint::from(7500u32))
    }

    fn max_rsi(&self) -> Result<BigUint, ValsetError> {
        Ok(BigUint::from(15000u32))
    }
}

/// Chain of blocks built up by the test.
pub struct MockChain {
    blocks: Mutex<BTreeMap<u64, FullBlock>>,
    head: Mutex<u64>,
    pub registry: Arc<MockRegistry>,
}

impl MockChain {
    pub fn new() -> Self {
        let mut blocks = BTreeMap::new();
        blocks.insert(
            0,
            FullBlock {
                header: header(0),
                receipts: vec![],
            },
        );
        Self {
            blocks: Mutex::new(blocks),
            head: Mutex::new(0),
            registry: Arc::new(MockRegistry::default()),
        }
    }

    pub fn head_number(&self) -> u64 {
        *self.head.lock().unwrap()
    }

    /// Append a block carrying one successful receipt with `logs`.
    pub fn push_block(&self, logs: Vec<Log>) -> FullBlock {
        let receipts = if logs.is_empty() {
            vec![]
        } else {
            vec![Receipt::success(logs)]
        };
        self.push_receipts(receipts)
    }

    pub fn push_receipts(&self, receipts: Vec<Receipt>) -> FullBlock {
        let mut head = self.head.lock().unwrap();
        *head += 1;
        let block = FullBlock {
            header: header(*head),
            receipts,
        };
        self.blocks.lock().unwrap().insert(*head, block.clone());
        block
    }

    pub fn block(&self, number: u64) -> FullBlock {
        self.blocks.lock().unwrap()[&number].clone()
    }

    /// Drop a block's header so range scans over it fail.
    pub fn forget_block(&self, number: u64) {
        self.blocks.lock().unwrap().remove(&number);
    }
}

impl ChainBackend for MockChain {
    fn current_header(&self) -> Result<Header, ValsetError> {
        Ok(header(self.head_number()))
    }

    fn header_by_number(&self, number: u64) -> Result<Option<Header>, ValsetError> {
        Ok(self.blocks.lock().unwrap().get(&number).map(|b| b.header.clone()))
    }

    fn receipts_by_hash(&self, hash: &Hash) -> Result<Vec<Receipt>, ValsetError> {
        self.blocks
            .lock()
            .unwrap()
            .values()
            .find(|b| b.header.hash == *hash)
            .map(|b| b.receipts.clone())
            .ok_or_else(|| ValsetError::Chain(format!("unknown block hash {}", hash)))
    }

    fn state_provider_for_block(
        &self,
        header: &Header,
    ) -> Result<Box<dyn StateProvider>, ValsetError> {
        Ok(Box::new(MockProvider {
            number: header.number,
        }))
    }

    fn system_state(
        &self,
        provider: Box<dyn StateProvider>,
    ) -> Result<Box<dyn SystemState>, ValsetError> {
        Ok(Box::new(MockSystemState {
            registry: Arc::clone(&self.registry),
            block: provider.block_number(),
        }))
    }
}
