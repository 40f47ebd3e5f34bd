// crates/valset-economics/src/lib.rs
//
// valset-economics: epoch reward calculation for the validator set.
//
// All monetary values are tracked in wei (the smallest unit of the staking
// token). 1 token = 10^18 wei. Rewards are computed in exact integer
// arithmetic so every node derives the same amount.

pub mod rewards;
pub mod token;

// Re-export key types for ergonomic access from downstream crates.
pub use rewards::{
    calc_max_reward, vesting_bonus, RewardsCalculator, DENOMINATOR, EPOCHS_IN_YEAR,
    MAX_VESTING_WEEKS, VESTING_BONUS,
};
pub use token::TokenAmount;
