// crates/valset-core/src/voting_power.rs
//
// Voting power from staked balance:
//
//   coins = stake / 10^18                 (whole coins, floored)
//   vp    = floor(coins ^ (num / den))    (0 when coins == 0)
//
// The power is computed exactly: the exponent is reduced by its gcd and the
// result is floor(den-th root of coins^num). Every node therefore derives the
// same voting power from the same stake, independent of platform floating
// point.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

use crate::decimal::BigNumDecimal;
use crate::error::ValsetError;

/// Number of base units in one whole coin (18 decimals).
pub const WEI_PER_COIN: u64 = 1_000_000_000_000_000_000;

/// Convert an 18-decimal amount to whole coins, discarding the fraction.
pub fn to_whole_coins(amount: &BigUint) -> BigUint {
    amount / BigUint::from(WEI_PER_COIN)
}

/// Compute voting power for `staked_balance` under `exponent`.
///
/// Amounts below one whole coin yield zero voting power for any exponent.
///
/// # Errors
/// Returns `ValsetError::Decode` for a zero exponent denominator and
/// `ValsetError::InvalidState` if the reduced exponent does not fit in `u32`.
pub fn calculate_voting_power(
    staked_balance: &BigUint,
    exponent: &BigNumDecimal,
) -> Result<BigUint, ValsetError> {
    exponent.ensure_valid()?;

    let coins = to_whole_coins(staked_balance);
    if coins.is_zero() {
        return Ok(BigUint::zero());
    }

    let gcd = exponent.numerator.gcd(&exponent.denominator);
    let num = (&exponent.numerator / &gcd).to_u32().ok_or_else(|| {
        ValsetError::InvalidState(format!("exponent numerator too large: {}", exponent))
    })?;
    let den = (&exponent.denominator / &gcd).to_u32().ok_or_else(|| {
        ValsetError::InvalidState(format!("exponent denominator too large: {}", exponent))
    })?;

    // gcd of (0, d) is d, so a zero exponent reduces to 0/1 and yields 1.
    let powered = coins.pow(num);
    if den == 1 {
        return Ok(powered);
    }
    Ok(powered.nth_root(den))
}
