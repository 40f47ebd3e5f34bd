// crates/valset-cli/src/output.rs
//
// Output formatting utilities for the valset CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

use valset_core::validator::ValidatorMetadata;

/// Output format for CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// A row in the validator table.
#[derive(Tabled)]
pub struct ValidatorRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Voting Power")]
    pub voting_power: String,
    #[tabled(rename = "Active")]
    pub active: String,
    #[tabled(rename = "BLS Key")]
    pub bls_key: String,
}

impl ValidatorRow {
    pub fn new(rank: usize, v: &ValidatorMetadata) -> Self {
        Self {
            rank,
            address: v.address.to_string(),
            voting_power: v.voting_power.to_string(),
            active: if v.is_active { "yes" } else { "no" }.to_string(),
            bls_key: match &v.bls_key {
                Some(key) => short_hex(key.as_bytes()),
                None => "--".to_string(),
            },
        }
    }
}

/// Abbreviate long byte strings as `0xabcd…ef01`.
fn short_hex(bytes: &[u8]) -> String {
    let full = hex::encode(bytes);
    if full.len() <= 12 {
        return format!("0x{}", full);
    }
    format!("0x{}…{}", &full[..6], &full[full.len() - 4..])
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}
