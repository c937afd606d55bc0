//! Gas pricing types for the wallet transaction engine.
//!
//! This module defines the canonical gas price table shared by the gas
//! subsystem and the transaction pipeline: speed tiers, per-tier price
//! snapshots, and computed transaction fees.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Speed tier for a transaction's gas price.
///
/// Ordered by increasing cost and decreasing confirmation wait. `Custom`
/// carries a user-supplied price and sits outside the oracle-provided
/// tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasSpeed {
	Slow,
	Normal,
	Fast,
	Custom,
}

impl GasSpeed {
	/// All tiers in canonical display order.
	pub const ALL: [GasSpeed; 4] = [
		GasSpeed::Slow,
		GasSpeed::Normal,
		GasSpeed::Fast,
		GasSpeed::Custom,
	];

	/// Lowercase name of the tier.
	pub fn as_str(&self) -> &'static str {
		match self {
			GasSpeed::Slow => "slow",
			GasSpeed::Normal => "normal",
			GasSpeed::Fast => "fast",
			GasSpeed::Custom => "custom",
		}
	}
}

impl std::fmt::Display for GasSpeed {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One tier's price snapshot.
///
/// Entries are immutable; a poll cycle replaces the whole table rather
/// than mutating entries in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPriceEntry {
	/// The tier this entry belongs to.
	pub speed: GasSpeed,
	/// Price per gas unit in wei.
	pub wei: U256,
	/// Human-readable price, e.g. "42 Gwei".
	pub gwei_display: String,
	/// Estimated confirmation wait in milliseconds.
	pub estimated_wait_ms: u64,
	/// Human-readable wait estimate, e.g. "~ 2 min".
	pub estimated_wait_display: String,
}

/// The canonical price table: one optional entry per tier.
///
/// `fast` is always present in a live table and serves as the fallback
/// tier when `custom` is requested but unset. The table is replaced
/// wholesale on each successful poll, except that an existing `custom`
/// entry is carried into the replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPriceTable {
	pub slow: Option<GasPriceEntry>,
	pub normal: Option<GasPriceEntry>,
	pub fast: Option<GasPriceEntry>,
	pub custom: Option<GasPriceEntry>,
}

impl GasPriceTable {
	/// Returns the entry for a tier, if present.
	pub fn entry(&self, speed: GasSpeed) -> Option<&GasPriceEntry> {
		match speed {
			GasSpeed::Slow => self.slow.as_ref(),
			GasSpeed::Normal => self.normal.as_ref(),
			GasSpeed::Fast => self.fast.as_ref(),
			GasSpeed::Custom => self.custom.as_ref(),
		}
	}

	/// Replaces the entry for a tier.
	pub fn set_entry(&mut self, speed: GasSpeed, entry: GasPriceEntry) {
		match speed {
			GasSpeed::Slow => self.slow = Some(entry),
			GasSpeed::Normal => self.normal = Some(entry),
			GasSpeed::Fast => self.fast = Some(entry),
			GasSpeed::Custom => self.custom = Some(entry),
		}
	}

	/// Copies a previous table's custom entry into this one.
	///
	/// User-entered custom prices survive provider refreshes until
	/// explicitly changed.
	pub fn carry_custom_from(&mut self, previous: &GasPriceTable) {
		if let Some(custom) = &previous.custom {
			self.custom = Some(custom.clone());
		}
	}
}

/// A computed transaction fee for one tier.
///
/// Derived from a price entry, a gas limit, and the native-currency rate
/// of the gas asset. Recomputed whenever the gas limit or selected tier
/// changes; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxFee {
	/// Total fee in wei (price x gas limit).
	pub wei: U256,
	/// Fee in the gas asset, e.g. "0.00252 ETH".
	pub display: String,
	/// Fee in the user's native currency, e.g. "$4.20".
	pub native_display: String,
}

/// Per-tier fee table mirroring [`GasPriceTable`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxFeeTable {
	pub slow: Option<TxFee>,
	pub normal: Option<TxFee>,
	pub fast: Option<TxFee>,
	pub custom: Option<TxFee>,
}

impl TxFeeTable {
	/// Returns the fee for a tier, if present.
	pub fn fee(&self, speed: GasSpeed) -> Option<&TxFee> {
		match speed {
			GasSpeed::Slow => self.slow.as_ref(),
			GasSpeed::Normal => self.normal.as_ref(),
			GasSpeed::Fast => self.fast.as_ref(),
			GasSpeed::Custom => self.custom.as_ref(),
		}
	}

	/// Replaces the fee for a tier.
	pub fn set_fee(&mut self, speed: GasSpeed, fee: Option<TxFee>) {
		match speed {
			GasSpeed::Slow => self.slow = fee,
			GasSpeed::Normal => self.normal = fee,
			GasSpeed::Fast => self.fast = fee,
			GasSpeed::Custom => self.custom = fee,
		}
	}
}

/// The user's currently selected price with its computed fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedGasPrice {
	pub entry: GasPriceEntry,
	pub fee: TxFee,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry(speed: GasSpeed, gwei: u64) -> GasPriceEntry {
		GasPriceEntry {
			speed,
			wei: U256::from(gwei) * U256::from(1_000_000_000u64),
			gwei_display: format!("{} Gwei", gwei),
			estimated_wait_ms: 60_000,
			estimated_wait_display: "~ 1 min".to_string(),
		}
	}

	#[test]
	fn custom_entry_survives_table_replacement() {
		let mut previous = GasPriceTable::default();
		previous.set_entry(GasSpeed::Custom, entry(GasSpeed::Custom, 42));

		let mut fresh = GasPriceTable {
			slow: Some(entry(GasSpeed::Slow, 8)),
			normal: Some(entry(GasSpeed::Normal, 10)),
			fast: Some(entry(GasSpeed::Fast, 20)),
			custom: None,
		};
		fresh.carry_custom_from(&previous);

		let custom = fresh.entry(GasSpeed::Custom).unwrap();
		assert_eq!(custom.gwei_display, "42 Gwei");
	}

	#[test]
	fn tier_order_is_slow_to_custom() {
		assert!(GasSpeed::Slow < GasSpeed::Normal);
		assert!(GasSpeed::Normal < GasSpeed::Fast);
		assert!(GasSpeed::Fast < GasSpeed::Custom);
	}
}
