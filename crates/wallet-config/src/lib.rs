//! Configuration module for the wallet transaction engine.
//!
//! Loads engine configuration from a TOML file and validates it before
//! any service is constructed. Sections map one-to-one onto the services
//! that consume them: the account being operated, the gas subsystem, the
//! pending-transaction watcher, and persistence.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading the configuration file.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error parsing TOML content.
	#[error("Parse error: {0}")]
	Parse(#[from] toml::de::Error),
	/// Error validating configuration values.
	#[error("Validation error: {0}")]
	Validation(String),
}

/// The account this engine instance operates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
	/// Checksummed or lowercase 0x-prefixed address.
	pub address: String,
	/// Network name used as part of persistence keys, e.g. "mainnet".
	pub network: String,
	/// Symbol prefixed to native-currency displays.
	#[serde(default = "default_currency_symbol")]
	pub native_currency_symbol: String,
}

fn default_currency_symbol() -> String {
	"$".to_string()
}

/// Gas subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasConfig {
	/// Endpoint of the primary price oracle.
	pub primary_oracle_url: String,
	/// Endpoint of the fallback price oracle.
	pub secondary_oracle_url: String,
	/// Seconds between price polls.
	#[serde(default = "default_gas_poll_interval")]
	pub poll_interval_secs: u64,
	/// Gas limit assumed before an operation supplies its own.
	#[serde(default = "default_gas_limit")]
	pub default_gas_limit: u64,
}

fn default_gas_poll_interval() -> u64 {
	15
}

fn default_gas_limit() -> u64 {
	21_000
}

/// Pending-transaction watcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
	/// Milliseconds between watcher ticks while transactions are pending.
	#[serde(default = "default_watcher_interval")]
	pub poll_interval_ms: u64,
}

impl Default for WatcherConfig {
	fn default() -> Self {
		Self {
			poll_interval_ms: default_watcher_interval(),
		}
	}
}

fn default_watcher_interval() -> u64 {
	1_000
}

/// Persistence configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
	/// Directory for the file backend; in-memory storage when unset.
	pub path: Option<String>,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	pub account: AccountConfig,
	pub gas: GasConfig,
	#[serde(default)]
	pub watcher: WatcherConfig,
	#[serde(default)]
	pub storage: StorageConfig,
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	/// Validates cross-field constraints that serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if !self.account.address.starts_with("0x") || self.account.address.len() != 42 {
			return Err(ConfigError::Validation(format!(
				"account.address must be a 0x-prefixed 20-byte hex address, got '{}'",
				self.account.address
			)));
		}
		if self.account.network.is_empty() {
			return Err(ConfigError::Validation(
				"account.network must not be empty".to_string(),
			));
		}
		if self.gas.primary_oracle_url.is_empty() || self.gas.secondary_oracle_url.is_empty() {
			return Err(ConfigError::Validation(
				"both gas oracle URLs must be set".to_string(),
			));
		}
		if self.gas.poll_interval_secs == 0 {
			return Err(ConfigError::Validation(
				"gas.poll_interval_secs must be greater than zero".to_string(),
			));
		}
		if self.watcher.poll_interval_ms == 0 {
			return Err(ConfigError::Validation(
				"watcher.poll_interval_ms must be greater than zero".to_string(),
			));
		}
		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let config: Config = toml::from_str(s)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	const VALID: &str = r#"
[account]
address = "0x1111111111111111111111111111111111111111"
network = "mainnet"

[gas]
primary_oracle_url = "https://api.etherscan.io/api"
secondary_oracle_url = "https://ethgasstation.info/json/ethgasAPI.json"
"#;

	#[test]
	fn loads_valid_config_with_defaults() {
		let temp_dir = TempDir::new().unwrap();
		let path = temp_dir.path().join("engine.toml");
		fs::write(&path, VALID).unwrap();

		let config = Config::from_file(&path).unwrap();
		assert_eq!(config.account.network, "mainnet");
		assert_eq!(config.gas.poll_interval_secs, 15);
		assert_eq!(config.watcher.poll_interval_ms, 1_000);
		assert!(config.storage.path.is_none());
	}

	#[test]
	fn rejects_malformed_address() {
		let bad = VALID.replace(
			"0x1111111111111111111111111111111111111111",
			"not-an-address",
		);
		let result: Result<Config, _> = bad.parse();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn rejects_zero_poll_interval() {
		let bad = format!("{}\npoll_interval_secs = 0\n", VALID);
		let result: Result<Config, _> = bad.parse();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}
}
