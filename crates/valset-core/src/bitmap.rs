// crates/valset-core/src/bitmap.rs
//
// Compact index set used by `ValidatorSetDelta::removed`. Bit `i` refers to
// position `i` of the *previous* account set, so a bitmap is only meaningful
// against the exact ordering it was computed from.

use bitvec::prelude::{BitVec, Lsb0};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Growable bit set with little-endian bit order inside each byte.
#[derive(Debug, Clone, Default)]
pub struct Bitmap {
    bits: BitVec<u8, Lsb0>,
}

impl Bitmap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a bitmap from its byte encoding.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bits: BitVec::from_slice(bytes),
        }
    }

    /// Set bit `index`, growing the bitmap as needed.
    pub fn set(&mut self, index: usize) {
        if index >= self.bits.len() {
            self.bits.resize(index + 1, false);
        }
        self.bits.set(index, true);
    }

    pub fn is_set(&self, index: usize) -> bool {
        self.bits.get(index).map(|b| *b).unwrap_or(false)
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Ascending indices of the set bits.
    pub fn set_indices(&self) -> Vec<usize> {
        self.bits.iter_ones().collect()
    }

    /// Highest set index, if any.
    pub fn highest(&self) -> Option<usize> {
        self.bits.last_one()
    }

    /// Byte encoding, padded with zero bits to a whole byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bits = self.bits.clone();
        bits.set_uninitialized(false);
        bits.into_vec()
    }
}

// Equality ignores trailing zero padding.
impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.bits.iter_ones().eq(other.bits.iter_ones())
    }
}

impl Eq for Bitmap {}

impl Serialize for Bitmap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.to_bytes()))
    }
}

impl<'de> Deserialize<'de> for Bitmap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s)
            .map(|bytes| Bitmap::from_bytes(&bytes))
            .map_err(serde::de::Error::custom)
    }
}
