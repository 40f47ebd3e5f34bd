// crates/valset-core/src/decimal.rs
//
// Exact rationals for chain-exposed fixed-point values (voting-power
// exponent, base reward, RSI, macro factor). Consensus-relevant math never
// touches floating point.

use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::error::ValsetError;

/// A rational number `numerator / denominator` of arbitrary-precision integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigNumDecimal {
    #[serde(with = "biguint_string")]
    pub numerator: BigUint,
    #[serde(with = "biguint_string")]
    pub denominator: BigUint,
}

impl BigNumDecimal {
    pub fn new(numerator: impl Into<BigUint>, denominator: impl Into<BigUint>) -> Self {
        Self {
            numerator: numerator.into(),
            denominator: denominator.into(),
        }
    }

    /// Reject a zero denominator before the value is used in arithmetic.
    pub fn ensure_valid(&self) -> Result<(), ValsetError> {
        if self.denominator.is_zero() {
            return Err(ValsetError::Decode(format!(
                "decimal {} has a zero denominator",
                self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for BigNumDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Serde adapter writing a `BigUint` as a base-10 string.
pub mod biguint_string {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(deserializer)?;
        BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid integer: {:?}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_denominator_rejected() {
        let d = BigNumDecimal::new(5000u32, 0u32);
        assert!(matches!(d.ensure_valid(), Err(ValsetError::Decode(_))));
        assert!(BigNumDecimal::new(5000u32, 10000u32).ensure_valid().is_ok());
    }

    #[test]
    fn test_serializes_as_decimal_strings() {
        let d = BigNumDecimal::new(8500u32, 10000u32);
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, r#"{"numerator":"8500","denominator":"10000"}"#);
        let back: BigNumDecimal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_display() {
        assert_eq!(BigNumDecimal::new(1u32, 2u32).to_string(), "1/2");
    }
}
