//! Normalization of oracle payloads onto the canonical price table, and
//! fee computation against it.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wallet_types::{
	convert_raw_to_native_display, gwei_to_wei, minimal_time_unit_display, raw_to_whole,
	GasPriceEntry, GasPriceTable, GasSpeed, TxFee, TxFeeTable,
};

use crate::{EthGasStationPrices, EtherscanPrices, OraclePayload};

const MS_PER_MINUTE: Decimal = Decimal::from_parts(60_000, 0, 0, false, 0);

/// Builds one tier entry from a gwei price and a wait estimate in
/// minutes.
pub fn format_gas_price(speed: GasSpeed, wait_minutes: Decimal, gwei: Decimal) -> GasPriceEntry {
	let wait_ms = (wait_minutes * MS_PER_MINUTE).to_u64().unwrap_or(0);
	GasPriceEntry {
		speed,
		wei: gwei_to_wei(gwei),
		gwei_display: format!("{} Gwei", gwei.round().normalize()),
		estimated_wait_ms: wait_ms,
		estimated_wait_display: minimal_time_unit_display(wait_ms),
	}
}

fn parse_etherscan(data: &EtherscanPrices) -> GasPriceTable {
	GasPriceTable {
		slow: Some(format_gas_price(
			GasSpeed::Slow,
			data.safe_low_wait_minutes,
			data.safe_low,
		)),
		normal: Some(format_gas_price(
			GasSpeed::Normal,
			data.avg_wait_minutes,
			data.average,
		)),
		fast: Some(format_gas_price(
			GasSpeed::Fast,
			data.fast_wait_minutes,
			data.fast,
		)),
		custom: None,
	}
}

fn parse_eth_gas_station(data: &EthGasStationPrices) -> GasPriceTable {
	// The provider reports tenths of a gwei.
	let ten = Decimal::from(10);
	GasPriceTable {
		slow: Some(format_gas_price(
			GasSpeed::Slow,
			data.safe_low_wait_minutes,
			data.safe_low / ten,
		)),
		normal: Some(format_gas_price(
			GasSpeed::Normal,
			data.avg_wait_minutes,
			data.average / ten,
		)),
		fast: Some(format_gas_price(
			GasSpeed::Fast,
			data.fast_wait_minutes,
			data.fast / ten,
		)),
		custom: None,
	}
}

/// Normalizes a provider payload onto the canonical table.
///
/// The returned table never has a `custom` entry; the service carries
/// any existing custom entry over from the table being replaced.
pub fn parse_gas_prices(payload: &OraclePayload) -> GasPriceTable {
	match payload {
		OraclePayload::Etherscan(data) => parse_etherscan(data),
		OraclePayload::EthGasStation(data) => parse_eth_gas_station(data),
	}
}

/// Computes the per-tier fee table for a gas limit.
///
/// `price_unit` is the native-currency price of one whole gas asset and
/// `currency_symbol` its display prefix.
pub fn parse_tx_fees(
	table: &GasPriceTable,
	price_unit: Decimal,
	gas_limit: u64,
	currency_symbol: &str,
) -> TxFeeTable {
	let mut fees = TxFeeTable::default();
	for speed in GasSpeed::ALL {
		let fee = table
			.entry(speed)
			.map(|entry| get_tx_fee(entry, gas_limit, price_unit, currency_symbol));
		fees.set_fee(speed, fee);
	}
	fees
}

fn get_tx_fee(
	entry: &GasPriceEntry,
	gas_limit: u64,
	price_unit: Decimal,
	currency_symbol: &str,
) -> TxFee {
	let wei = entry.wei * alloy_primitives::U256::from(gas_limit);
	let amount = raw_to_whole(wei, 18).normalize();
	TxFee {
		wei,
		display: format!("{} ETH", amount),
		native_display: convert_raw_to_native_display(wei, 18, price_unit, currency_symbol),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::U256;

	fn dec(s: &str) -> Decimal {
		s.parse().unwrap()
	}

	#[test]
	fn etherscan_payload_preserves_tier_ordering() {
		let payload = OraclePayload::Etherscan(EtherscanPrices {
			fast: dec("200"),
			average: dec("100"),
			safe_low: dec("80"),
			fast_wait_minutes: dec("0.5"),
			avg_wait_minutes: dec("3"),
			safe_low_wait_minutes: dec("10"),
		});

		let table = parse_gas_prices(&payload);
		let slow = table.entry(GasSpeed::Slow).unwrap().wei;
		let normal = table.entry(GasSpeed::Normal).unwrap().wei;
		let fast = table.entry(GasSpeed::Fast).unwrap().wei;

		assert!(slow <= normal && normal <= fast);
		assert_eq!(fast, U256::from(200_000_000_000u64));
		assert!(table.entry(GasSpeed::Custom).is_none());
	}

	#[test]
	fn eth_gas_station_tenth_gwei_units_are_divided() {
		let payload = OraclePayload::EthGasStation(EthGasStationPrices {
			fastest: dec("500"),
			fast: dec("300"),
			average: dec("100"),
			safe_low: dec("80"),
			fastest_wait_minutes: dec("0.5"),
			fast_wait_minutes: dec("1"),
			avg_wait_minutes: dec("3"),
			safe_low_wait_minutes: dec("10"),
		});

		let table = parse_gas_prices(&payload);
		// 300 tenths of a gwei -> 30 gwei.
		assert_eq!(
			table.entry(GasSpeed::Fast).unwrap().wei,
			U256::from(30_000_000_000u64)
		);
		assert_eq!(table.entry(GasSpeed::Fast).unwrap().gwei_display, "30 Gwei");
	}

	#[test]
	fn wait_estimates_become_millis_with_display() {
		let entry = format_gas_price(GasSpeed::Normal, dec("3"), dec("100"));
		assert_eq!(entry.estimated_wait_ms, 180_000);
		assert_eq!(entry.estimated_wait_display, "~ 3 min");
	}

	#[test]
	fn fee_is_price_times_limit_with_native_conversion() {
		let mut table = GasPriceTable::default();
		table.set_entry(GasSpeed::Fast, format_gas_price(GasSpeed::Fast, dec("1"), dec("100")));

		// 100 gwei * 21000 gas = 0.0021 ETH; at $2000/ETH that is $4.20.
		let fees = parse_tx_fees(&table, dec("2000"), 21_000, "$");
		let fast = fees.fee(GasSpeed::Fast).unwrap();
		assert_eq!(fast.wei, U256::from(2_100_000_000_000_000u64));
		assert_eq!(fast.native_display, "$4.20");
		assert!(fees.fee(GasSpeed::Slow).is_none());
	}
}
