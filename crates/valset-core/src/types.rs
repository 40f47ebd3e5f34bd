// crates/valset-core/src/types.rs
//
// Chain primitives consumed by the validator-set core: addresses, hashes,
// headers, receipts, and logs. These mirror the read interface of the
// execution engine; nothing here executes transactions.
//
// Fixed-size identifiers serialize as `0x`-prefixed lowercase hex strings so
// they can be used as JSON object keys in the persisted snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValsetError;

/// Length of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Length of a hash in bytes.
pub const HASH_LENGTH: usize = 32;

macro_rules! fixed_bytes {
    ($name:ident, $len:expr) => {
        impl $name {
            /// Build from a byte slice. Longer input keeps the trailing bytes,
            /// shorter input is left-padded with zeros.
            pub fn from_slice(bytes: &[u8]) -> Self {
                let mut out = [0u8; $len];
                if bytes.len() >= $len {
                    out.copy_from_slice(&bytes[bytes.len() - $len..]);
                } else {
                    out[$len - bytes.len()..].copy_from_slice(bytes);
                }
                $name(out)
            }

            /// Raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }

        impl FromStr for $name {
            type Err = ValsetError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(trimmed)?;
                if bytes.len() != $len {
                    return Err(ValsetError::Decode(format!(
                        "expected {} bytes for {}, got {}",
                        $len,
                        stringify!($name),
                        bytes.len()
                    )));
                }
                Ok(Self::from_slice(&bytes))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

/// A 20-byte chain account address. Ordering is plain byte ordering.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; ADDRESS_LENGTH]);

fixed_bytes!(Address, ADDRESS_LENGTH);

/// A 32-byte hash (block hash, log topic).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Hash(pub [u8; HASH_LENGTH]);

fixed_bytes!(Hash, HASH_LENGTH);

/// Opaque BLS public key used by consensus to verify validator signatures.
///
/// The key is never interpreted here; it is carried from the registry
/// contract to the active validator set.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BlsPublicKey(pub Vec<u8>);

impl BlsPublicKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for BlsPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlsPublicKey({})", hex::encode(&self.0))
    }
}

impl Serialize for BlsPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for BlsPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s))
            .map(BlsPublicKey)
            .map_err(serde::de::Error::custom)
    }
}

/// Minimal block header: what the stake core needs to address chain state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    pub number: u64,
    pub hash: Hash,
}

/// A contract log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Emitting contract.
    pub address: Address,
    pub topics: Vec<Hash>,
    pub data: Vec<u8>,
}

/// Execution outcome of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Success,
    Failed,
}

/// A transaction receipt with its logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// `None` for receipts whose status was never recorded.
    pub status: Option<ReceiptStatus>,
    pub logs: Vec<Log>,
}

impl Receipt {
    /// A successful receipt carrying the given logs.
    pub fn success(logs: Vec<Log>) -> Self {
        Self {
            status: Some(ReceiptStatus::Success),
            logs,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(ReceiptStatus::Success)
    }
}

/// A finalized block together with its receipts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FullBlock {
    pub header: Header,
    pub receipts: Vec<Receipt>,
}

impl FullBlock {
    pub fn number(&self) -> u64 {
        self.header.number
    }
}
