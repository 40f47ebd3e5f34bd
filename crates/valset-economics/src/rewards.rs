// crates/valset-economics/src/rewards.rs
//
// Maximum epoch reward for the staked supply.
//
//   reward = staked * (base + vesting) * (macro * rsi) / DENOMINATOR^3 / EPOCHS_IN_YEAR
//
// `base`, `vesting`, `macro`, and `rsi` are all fixed-point values scaled by
// DENOMINATOR. The numerator is assembled in full before the two floor
// divisions, in that order; changing the order changes the result.

use std::sync::Arc;

use num_bigint::BigUint;
use tracing::debug;

use valset_core::error::ValsetError;
use valset_core::traits::{ChainBackend, SystemState};
use valset_core::types::Header;

/// Fixed-point scale of every reward factor (basis points of a percent).
pub const DENOMINATOR: u64 = 10_000;

/// Number of epochs per year.
pub const EPOCHS_IN_YEAR: u64 = 31_500;

/// Longest vesting period covered by the bonus table.
pub const MAX_VESTING_WEEKS: u64 = 52;

/// Vesting bonus per week of vesting (index 0 is one week), scaled by DENOMINATOR.
pub const VESTING_BONUS: [u64; 52] = [
    6, 16, 30, 46, 65, 85, 108, 131, 157, 184, 212, 241, 272, 304, 338, 372, 407, 444, 481, 520,
    559, 599, 641, 683, 726, 770, 815, 861, 907, 955, 1003, 1052, 1101, 1152, 1203, 1255, 1307,
    1361, 1415, 1470, 1525, 1581, 1638, 1696, 1754, 1812, 1872, 1932, 1993, 2054, 2116, 2178,
];

/// Bonus for `weeks` of vesting.
///
/// # Errors
/// Returns `ValsetError::InvalidState` for weeks outside `1..=52`.
pub fn vesting_bonus(weeks: u64) -> Result<u64, ValsetError> {
    if weeks == 0 || weeks > MAX_VESTING_WEEKS {
        return Err(ValsetError::InvalidState(format!(
            "vesting period must be between 1 and {} weeks, got {}",
            MAX_VESTING_WEEKS, weeks
        )));
    }
    Ok(VESTING_BONUS[(weeks - 1) as usize])
}

/// The reward formula over already-fetched inputs.
pub fn calc_max_reward(
    staked: &BigUint,
    base: &BigUint,
    vesting: &BigUint,
    rsi: &BigUint,
    macro_factor: &BigUint,
) -> BigUint {
    let denominator = BigUint::from(DENOMINATOR);
    let den_cubed = &denominator * &denominator * &denominator;

    let numerator = (base + vesting) * (macro_factor * rsi);
    staked * numerator / den_cubed / BigUint::from(EPOCHS_IN_YEAR)
}

/// Reads reward inputs from chain state and applies the reward formula.
pub struct RewardsCalculator {
    chain: Arc<dyn ChainBackend>,
}

impl RewardsCalculator {
    pub fn new(chain: Arc<dyn ChainBackend>) -> Self {
        Self { chain }
    }

    /// Maximum reward distributable for the epoch ending at `block`,
    /// assuming the full 52-week vesting bonus.
    pub fn max_reward(&self, block: &Header) -> Result<BigUint, ValsetError> {
        let state = self.system_state(block)?;

        let staked = state.staked_balance()?;
        let base = state.base_reward()?;
        let vesting = BigUint::from(vesting_bonus(MAX_VESTING_WEEKS)?);
        let rsi = state.max_rsi()?;
        let macro_factor = state.macro_factor()?;

        let reward = calc_max_reward(&staked, &base.numerator, &vesting, &rsi, &macro_factor);
        debug!(
            block = block.number,
            staked = %staked,
            base = %base,
            rsi = %rsi,
            macro_factor = %macro_factor,
            reward = %reward,
            "max epoch reward"
        );
        Ok(reward)
    }

    fn system_state(&self, block: &Header) -> Result<Box<dyn SystemState>, ValsetError> {
        let provider = self.chain.state_provider_for_block(block)?;
        self.chain.system_state(provider)
    }
}
