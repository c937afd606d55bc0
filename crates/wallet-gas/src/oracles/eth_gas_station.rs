//! EthGasStation oracle adapter.
//!
//! One endpoint returns the whole fee-market snapshot. Prices are in
//! tenths of a gwei on the wire; normalization divides by ten.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{EthGasStationPrices, GasError, GasOracleInterface, OraclePayload};

/// EthGasStation API client.
pub struct EthGasStationOracle {
	client: reqwest::Client,
	url: String,
}

#[derive(Debug, Deserialize)]
struct EthGasStationResult {
	fastest: Decimal,
	fast: Decimal,
	average: Decimal,
	#[serde(rename = "safeLow")]
	safe_low: Decimal,
	#[serde(rename = "fastestWait")]
	fastest_wait: Decimal,
	#[serde(rename = "fastWait")]
	fast_wait: Decimal,
	#[serde(rename = "avgWait")]
	avg_wait: Decimal,
	#[serde(rename = "safeLowWait")]
	safe_low_wait: Decimal,
}

impl EthGasStationOracle {
	/// Creates a client for the given endpoint URL.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			url: url.into(),
		}
	}

	async fn get_snapshot(&self) -> Result<EthGasStationResult, GasError> {
		let response = self
			.client
			.get(&self.url)
			.send()
			.await
			.map_err(|e| GasError::Oracle(format!("ethgasstation request failed: {}", e)))?;

		if !response.status().is_success() {
			return Err(GasError::Oracle(format!(
				"ethgasstation returned HTTP {}",
				response.status()
			)));
		}

		response
			.json()
			.await
			.map_err(|e| GasError::Oracle(format!("ethgasstation payload malformed: {}", e)))
	}
}

#[async_trait]
impl GasOracleInterface for EthGasStationOracle {
	async fn fetch_prices(&self) -> Result<OraclePayload, GasError> {
		let result = self.get_snapshot().await?;

		tracing::debug!(
			fast = %result.fast,
			average = %result.average,
			safe_low = %result.safe_low,
			"Fetched ethgasstation gas prices"
		);

		Ok(OraclePayload::EthGasStation(EthGasStationPrices {
			fastest: result.fastest,
			fast: result.fast,
			average: result.average,
			safe_low: result.safe_low,
			fastest_wait_minutes: result.fastest_wait,
			fast_wait_minutes: result.fast_wait,
			avg_wait_minutes: result.avg_wait,
			safe_low_wait_minutes: result.safe_low_wait,
		}))
	}

	async fn estimated_wait_for_price(&self, gwei: Decimal) -> Result<u64, GasError> {
		use rust_decimal::prelude::ToPrimitive;

		// No per-price endpoint; bucket the price against the current
		// tiers and report that tier's wait.
		let snapshot = self.get_snapshot().await?;
		let tenths = gwei * Decimal::from(10);

		let minutes = if tenths >= snapshot.fastest {
			snapshot.fastest_wait
		} else if tenths >= snapshot.fast {
			snapshot.fast_wait
		} else if tenths >= snapshot.average {
			snapshot.avg_wait
		} else {
			snapshot.safe_low_wait
		};

		Ok((minutes * Decimal::from(60_000)).to_u64().unwrap_or(0))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserializes_wire_payload() {
		let body = r#"{
			"fastest": 500.0,
			"fast": 300.0,
			"average": 100.0,
			"safeLow": 80.0,
			"fastestWait": 0.5,
			"fastWait": 1.0,
			"avgWait": 3.0,
			"safeLowWait": 10.0,
			"blockNum": 12345678
		}"#;

		let result: EthGasStationResult = serde_json::from_str(body).unwrap();
		assert_eq!(result.fast, Decimal::from(300));
		assert_eq!(result.safe_low_wait, Decimal::from(10));
	}
}
