//! Asset types for the wallet transaction engine.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::units::ETH_ADDRESS;

/// A token or the native gas asset, with the balance and pricing data the
/// fee calculator and the transaction normalizer need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
	/// Token contract address, or [`ETH_ADDRESS`] for the native asset.
	pub address: String,
	pub name: String,
	pub symbol: String,
	pub decimals: u8,
	/// Spendable balance in the asset's raw (smallest) units.
	pub balance: U256,
	/// Native-currency price of one whole unit of the asset.
	pub price_unit: Decimal,
}

impl Asset {
	/// The native gas asset with the given balance and price.
	pub fn ether(balance: U256, price_unit: Decimal) -> Self {
		Self {
			address: ETH_ADDRESS.to_string(),
			name: "Ethereum".to_string(),
			symbol: "ETH".to_string(),
			decimals: 18,
			balance,
			price_unit,
		}
	}

	/// Whether this asset is the native gas asset.
	pub fn is_native(&self) -> bool {
		self.address == ETH_ADDRESS
	}
}
