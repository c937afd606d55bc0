//! Etherscan gas-tracker oracle adapter.
//!
//! The gas-oracle endpoint returns only prices, so per-tier wait
//! estimates come from the separate `gasestimate` endpoint, one call per
//! tier.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use wallet_types::gwei_to_wei;

use crate::{EtherscanPrices, GasError, GasOracleInterface, OraclePayload};

/// Etherscan gas-tracker client.
pub struct EtherscanOracle {
	client: reqwest::Client,
	base_url: String,
	api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EtherscanResponse<T> {
	status: String,
	result: T,
}

#[derive(Debug, Deserialize)]
struct GasOracleResult {
	#[serde(rename = "SafeGasPrice")]
	safe_gas_price: String,
	#[serde(rename = "ProposeGasPrice")]
	propose_gas_price: String,
	#[serde(rename = "FastGasPrice")]
	fast_gas_price: String,
}

impl EtherscanOracle {
	/// Creates a client for the given API base URL.
	pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			base_url: base_url.into(),
			api_key,
		}
	}

	fn key_param(&self) -> String {
		match &self.api_key {
			Some(key) => format!("&apikey={}", key),
			None => String::new(),
		}
	}

	async fn get<T: serde::de::DeserializeOwned>(&self, query: &str) -> Result<T, GasError> {
		let url = format!("{}?{}{}", self.base_url, query, self.key_param());
		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| GasError::Oracle(format!("etherscan request failed: {}", e)))?;

		if !response.status().is_success() {
			return Err(GasError::Oracle(format!(
				"etherscan returned HTTP {}",
				response.status()
			)));
		}

		let body: EtherscanResponse<T> = response
			.json()
			.await
			.map_err(|e| GasError::Oracle(format!("etherscan payload malformed: {}", e)))?;

		if body.status != "1" {
			return Err(GasError::Oracle("etherscan reported an error".to_string()));
		}
		Ok(body.result)
	}

	async fn estimate_minutes(&self, gwei: Decimal) -> Result<Decimal, GasError> {
		let wei = gwei_to_wei(gwei);
		let seconds: String = self
			.get(&format!(
				"module=gastracker&action=gasestimate&gasprice={}",
				wei
			))
			.await?;
		let seconds: Decimal = seconds
			.parse()
			.map_err(|e| GasError::Oracle(format!("etherscan estimate malformed: {}", e)))?;
		Ok(seconds / Decimal::from(60))
	}
}

fn parse_gwei(value: &str, field: &str) -> Result<Decimal, GasError> {
	value
		.parse()
		.map_err(|e| GasError::Oracle(format!("etherscan {} malformed: {}", field, e)))
}

#[async_trait]
impl GasOracleInterface for EtherscanOracle {
	async fn fetch_prices(&self) -> Result<OraclePayload, GasError> {
		let oracle: GasOracleResult = self.get("module=gastracker&action=gasoracle").await?;

		let safe_low = parse_gwei(&oracle.safe_gas_price, "SafeGasPrice")?;
		let average = parse_gwei(&oracle.propose_gas_price, "ProposeGasPrice")?;
		let fast = parse_gwei(&oracle.fast_gas_price, "FastGasPrice")?;

		let safe_low_wait_minutes = self.estimate_minutes(safe_low).await?;
		let avg_wait_minutes = self.estimate_minutes(average).await?;
		let fast_wait_minutes = self.estimate_minutes(fast).await?;

		tracing::debug!(%fast, %average, %safe_low, "Fetched etherscan gas prices");

		Ok(OraclePayload::Etherscan(EtherscanPrices {
			fast,
			average,
			safe_low,
			fast_wait_minutes,
			avg_wait_minutes,
			safe_low_wait_minutes,
		}))
	}

	async fn estimated_wait_for_price(&self, gwei: Decimal) -> Result<u64, GasError> {
		use rust_decimal::prelude::ToPrimitive;
		let minutes = self.estimate_minutes(gwei).await?;
		Ok((minutes * Decimal::from(60_000)).to_u64().unwrap_or(0))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserializes_gas_oracle_payload() {
		let body = r#"{
			"status": "1",
			"message": "OK",
			"result": {
				"LastBlock": "12345678",
				"SafeGasPrice": "80",
				"ProposeGasPrice": "100",
				"FastGasPrice": "200"
			}
		}"#;

		let response: EtherscanResponse<GasOracleResult> = serde_json::from_str(body).unwrap();
		assert_eq!(response.status, "1");
		assert_eq!(response.result.fast_gas_price, "200");
		assert_eq!(parse_gwei(&response.result.safe_gas_price, "SafeGasPrice").unwrap(), Decimal::from(80));
	}

	#[test]
	fn rejects_malformed_price_field() {
		assert!(parse_gwei("not-a-number", "FastGasPrice").is_err());
	}
}
