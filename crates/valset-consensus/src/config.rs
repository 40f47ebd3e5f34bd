// crates/valset-consensus/src/config.rs
//
// Runtime configuration for the stake manager.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use valset_core::error::ValsetError;
use valset_core::types::Address;

/// Runtime configuration for stake accounting.
#[derive(Debug, Clone, Deserialize)]
pub struct StakeConfig {
    /// Upper bound on the active validator set.
    #[serde(default = "default_max_validator_set_size")]
    pub max_validator_set_size: usize,

    /// Address of the validator registry contract emitting `StakeChanged`.
    #[serde(default = "default_validator_set_address")]
    pub validator_set_address: Address,

    /// Directory for local data storage (RocksDB).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_validator_set_size() -> usize {
    100
}

fn default_validator_set_address() -> Address {
    Address::from_slice(&[0x01, 0x01])
}

fn default_data_dir() -> String {
    "~/.valset/data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StakeConfig {
    fn default() -> Self {
        Self {
            max_validator_set_size: default_max_validator_set_size(),
            validator_set_address: default_validator_set_address(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl StakeConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &str) -> Result<Self, ValsetError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ValsetError::Config(format!("cannot read {}: {}", path, e)))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ValsetError> {
        let config: StakeConfig =
            toml::from_str(contents).map_err(|e| ValsetError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the stake manager cannot operate with.
    pub fn validate(&self) -> Result<(), ValsetError> {
        if self.max_validator_set_size == 0 {
            return Err(ValsetError::Config(
                "max_validator_set_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// `data_dir` with a leading `~` expanded to the home directory.
    pub fn data_dir_path(&self) -> String {
        expand_tilde(&self.data_dir)
    }
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
