//! Gas price subsystem for the wallet transaction engine.
//!
//! This module fetches fee-market data from competing price oracles,
//! normalizes it onto the canonical per-tier price table, computes
//! displayable transaction fees, and owns the polling lifecycle. The
//! subsystem is an explicitly owned service: consumers hold a
//! [`GasService`] and call `start_polling`/`stop_polling` rather than
//! touching module-level state.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod parser;
pub mod service;

/// Re-export oracle adapters
pub mod oracles {
	pub mod eth_gas_station;
	pub mod etherscan;
}

pub use parser::{format_gas_price, parse_gas_prices, parse_tx_fees};
pub use service::{CustomPriceCheck, GasService, SpeedSelection};

/// Errors that can occur in the gas price subsystem.
#[derive(Debug, Error)]
pub enum GasError {
	/// Error fetching or decoding one oracle's payload.
	#[error("Oracle error: {0}")]
	Oracle(String),
	/// Both the primary and the fallback oracle failed.
	#[error("All gas price sources failed: primary: {primary}; secondary: {secondary}")]
	AllSourcesFailed { primary: String, secondary: String },
	/// No price table is available yet.
	#[error("No gas price data available")]
	NoData,
	/// A custom price was rejected before submission.
	#[error("Invalid custom gas price: {0}")]
	InvalidCustomPrice(String),
}

/// Raw fee-market data from an Etherscan-shaped oracle.
///
/// Prices are in gwei, waits in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtherscanPrices {
	pub fast: Decimal,
	pub average: Decimal,
	pub safe_low: Decimal,
	pub fast_wait_minutes: Decimal,
	pub avg_wait_minutes: Decimal,
	pub safe_low_wait_minutes: Decimal,
}

/// Raw fee-market data from an EthGasStation-shaped oracle.
///
/// Prices are in tenths of a gwei (the provider's wire unit), waits in
/// minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EthGasStationPrices {
	pub fastest: Decimal,
	pub fast: Decimal,
	pub average: Decimal,
	pub safe_low: Decimal,
	pub fastest_wait_minutes: Decimal,
	pub fast_wait_minutes: Decimal,
	pub avg_wait_minutes: Decimal,
	pub safe_low_wait_minutes: Decimal,
}

/// A provider-specific payload, tagged by source shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OraclePayload {
	Etherscan(EtherscanPrices),
	EthGasStation(EthGasStationPrices),
}

/// Trait defining the interface for gas price oracles.
#[async_trait]
pub trait GasOracleInterface: Send + Sync {
	/// Fetches the provider's current fee-market snapshot.
	async fn fetch_prices(&self) -> Result<OraclePayload, GasError>;

	/// Estimated confirmation wait for a given gwei price, in
	/// milliseconds.
	async fn estimated_wait_for_price(&self, gwei: Decimal) -> Result<u64, GasError>;
}
