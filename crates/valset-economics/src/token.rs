// crates/valset-economics/src/token.rs
//
// Staking token amounts. The smallest unit is the wei; 1 token = 10^18 wei.
// Amounts can exceed u64, so they are carried as BigUint.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use valset_core::decimal::biguint_string;
use valset_core::error::ValsetError;
use valset_core::voting_power::WEI_PER_COIN;

/// Decimal places of the token.
pub const DECIMALS: usize = 18;

/// A token amount in wei.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount {
    #[serde(with = "biguint_string")]
    pub wei: BigUint,
}

impl TokenAmount {
    pub fn from_wei(wei: BigUint) -> Self {
        Self { wei }
    }

    /// Amount of `coins` whole tokens.
    pub fn from_coins(coins: u64) -> Self {
        Self {
            wei: BigUint::from(coins) * BigUint::from(WEI_PER_COIN),
        }
    }

    pub fn zero() -> Self {
        Self {
            wei: BigUint::zero(),
        }
    }
}

impl FromStr for TokenAmount {
    type Err = ValsetError;

    /// Parse a base-10 wei amount.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigUint::parse_bytes(s.trim().as_bytes(), 10)
            .map(TokenAmount::from_wei)
            .ok_or_else(|| ValsetError::Decode(format!("invalid wei amount: {:?}", s)))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = BigUint::from(WEI_PER_COIN);
        let whole = &self.wei / &unit;
        let frac = &self.wei % &unit;
        if frac.is_zero() {
            write!(f, "{}", whole)
        } else {
            // Up to 18 decimal places, trailing zeros trimmed
            let frac_str = format!("{:0>width$}", frac.to_str_radix(10), width = DECIMALS);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{}", whole, trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_coins() {
        let amount = TokenAmount::from_coins(3);
        assert_eq!(amount.wei.to_string(), "3000000000000000000");
    }

    #[test]
    fn test_display_whole() {
        assert_eq!(TokenAmount::from_coins(42).to_string(), "42");
        assert_eq!(TokenAmount::zero().to_string(), "0");
    }

    #[test]
    fn test_display_fractional() {
        let amount: TokenAmount = "1500000000000000000".parse().unwrap();
        assert_eq!(amount.to_string(), "1.5");
        let reward: TokenAmount = "9564285714285".parse().unwrap();
        assert_eq!(reward.to_string(), "0.000009564285714285");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("12x".parse::<TokenAmount>().is_err());
        assert!("".parse::<TokenAmount>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let amount = TokenAmount::from_coins(1);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, r#"{"wei":"1000000000000000000"}"#);
    }
}
