//! Conversion utilities for gas and asset amounts.
//!
//! Wei amounts are carried as [`U256`] end to end; [`Decimal`] is used
//! only at the display boundary, where the 96-bit mantissa comfortably
//! covers realistic balances and prices.

use alloy_primitives::U256;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::asset::Asset;
use crate::units::WEI_PER_GWEI;

/// Converts a gwei amount (possibly fractional) into wei.
///
/// Fractions of a wei are truncated.
pub fn gwei_to_wei(gwei: Decimal) -> U256 {
	let wei = (gwei * Decimal::from(WEI_PER_GWEI)).trunc();
	match wei.to_u128() {
		Some(value) => U256::from(value),
		None => U256::ZERO,
	}
}

/// Converts a wei amount into gwei.
pub fn wei_to_gwei(wei: U256) -> Decimal {
	decimal_from_u256(wei) / Decimal::from(WEI_PER_GWEI)
}

/// Lossy conversion from [`U256`] to [`Decimal`].
///
/// Values beyond `Decimal`'s range saturate to `Decimal::MAX`; display
/// math never needs the full 256-bit range.
pub fn decimal_from_u256(value: U256) -> Decimal {
	match u128::try_from(value) {
		Ok(v) => Decimal::from_u128(v).unwrap_or(Decimal::MAX),
		Err(_) => Decimal::MAX,
	}
}

/// Converts a raw (smallest-unit) amount into whole asset units.
pub fn raw_to_whole(raw: U256, decimals: u8) -> Decimal {
	// 1 * 10^-decimals; token decimals stay well inside Decimal's scale.
	let unit = Decimal::new(1, decimals.min(28) as u32);
	decimal_from_u256(raw) * unit
}

/// Formats a raw amount as a balance display, e.g. "1.5 DAI".
pub fn convert_raw_to_balance_display(raw: U256, asset: &Asset) -> String {
	let whole = raw_to_whole(raw, asset.decimals).normalize();
	format!("{} {}", whole, asset.symbol)
}

/// Formats a raw amount as a native-currency display, e.g. "$12.34".
///
/// `price_unit` is the native-currency price of one whole asset unit.
pub fn convert_raw_to_native_display(
	raw: U256,
	decimals: u8,
	price_unit: Decimal,
	currency_symbol: &str,
) -> String {
	let native = (raw_to_whole(raw, decimals) * price_unit).round_dp(2);
	format!("{}{}", currency_symbol, native)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dec(s: &str) -> Decimal {
		s.parse().unwrap()
	}

	#[test]
	fn gwei_to_wei_round_trip() {
		let wei = gwei_to_wei(Decimal::from(42));
		assert_eq!(wei, U256::from(42_000_000_000u64));
		assert_eq!(wei_to_gwei(wei), Decimal::from(42));
	}

	#[test]
	fn fractional_gwei_truncates_to_wei() {
		assert_eq!(gwei_to_wei(dec("1.5")), U256::from(1_500_000_000u64));
	}

	#[test]
	fn balance_display_trims_trailing_zeros() {
		let asset = Asset {
			address: "0xdai".to_string(),
			name: "Dai".to_string(),
			symbol: "DAI".to_string(),
			decimals: 18,
			balance: U256::ZERO,
			price_unit: Decimal::ONE,
		};
		let raw = U256::from(1_500_000_000_000_000_000u128);
		assert_eq!(convert_raw_to_balance_display(raw, &asset), "1.5 DAI");
	}

	#[test]
	fn native_display_applies_price_and_rounds() {
		let raw = U256::from(2_000_000_000_000_000_000u128); // 2 ETH
		let display = convert_raw_to_native_display(raw, 18, dec("1234.567"), "$");
		assert_eq!(display, "$2469.13");
	}
}
