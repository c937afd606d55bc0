//! Swap action (Uniswap-style token-to-token trade).
//!
//! Sells the input token on the exchange named by `contract_address`.
//! The acceptable output floor comes from the pair's reserve snapshot:
//! constant-product output less the 0.3% trade fee, with 1% slippage
//! allowance on top.

use alloy_primitives::U256;
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use wallet_signer::TransactionRequest;
use wallet_txs::NewTransaction;
use wallet_types::{Protocol, TransactionKind, GAS_LIMIT_SWAP};

use super::{action_nonce, deadline, encode_call_data, gas_price_wei, parse_address};
use crate::{RapAction, RapActionParameters, RapContext, RapError, SwapReserves};

sol! {
	function tokenToTokenSwapInput(uint256 tokens_sold, uint256 min_tokens_bought, uint256 min_eth_bought, uint256 deadline, address token_addr) external returns (uint256);
}

/// Constant-product output for `amount_in` against the reserves, after
/// the 0.3% trade fee.
pub fn swap_output(amount_in: U256, reserves: &SwapReserves) -> U256 {
	let amount_with_fee = amount_in * U256::from(997u64);
	let numerator = reserves.output_reserve * amount_with_fee;
	let denominator = reserves.input_reserve * U256::from(1000u64) + amount_with_fee;
	if denominator.is_zero() {
		return U256::ZERO;
	}
	numerator / denominator
}

/// Minimum acceptable output: the quoted output less 1% slippage.
pub fn minimum_output(amount_in: U256, reserves: &SwapReserves) -> U256 {
	swap_output(amount_in, reserves) * U256::from(99u64) / U256::from(100u64)
}

/// Swaps the input token for the output token via reserve data.
pub struct Swap;

#[async_trait]
impl RapAction for Swap {
	fn name(&self) -> &'static str {
		"swap"
	}

	async fn execute(
		&self,
		ctx: &RapContext,
		index: usize,
		parameters: &RapActionParameters,
		base_nonce: Option<u64>,
	) -> Result<u64, RapError> {
		let input = parameters
			.input_asset
			.as_ref()
			.ok_or(RapError::MissingParameter("input_asset"))?;
		let output = parameters
			.output_asset
			.as_ref()
			.ok_or(RapError::MissingParameter("output_asset"))?;
		let amount = parameters
			.input_amount
			.ok_or(RapError::MissingParameter("input_amount"))?;
		let exchange = parameters
			.contract_address
			.as_deref()
			.ok_or(RapError::MissingParameter("contract_address"))?;
		let reserves = parameters
			.reserves
			.ok_or(RapError::MissingParameter("reserves"))?;

		let gas_price = gas_price_wei(ctx).await?;
		let call = tokenToTokenSwapInputCall {
			tokens_sold: amount,
			min_tokens_bought: minimum_output(amount, &reserves),
			min_eth_bought: U256::from(1u64),
			deadline: deadline(),
			token_addr: parse_address(&output.address)?,
		};
		let data = encode_call_data(call.abi_encode());

		let request = TransactionRequest {
			to: exchange.to_string(),
			value: U256::ZERO,
			data: Some(data.clone()),
			gas_limit: Some(GAS_LIMIT_SWAP),
			gas_price: Some(gas_price),
			nonce: action_nonce(base_nonce, index),
		};

		let receipt = ctx.signer.sign_and_broadcast(request).await?;
		tracing::info!(tx_hash = %receipt.hash, nonce = receipt.nonce, "Swap broadcast");

		ctx.transactions
			.add_transaction(&NewTransaction {
				hash: receipt.hash.clone(),
				from: ctx.transactions.account_address().to_string(),
				to: receipt.to,
				nonce: Some(receipt.nonce),
				kind: TransactionKind::Trade,
				protocol: Some(Protocol::Uniswap),
				status: None,
				asset: Some(input.clone()),
				amount,
				gas_limit: Some(GAS_LIMIT_SWAP),
				gas_price: Some(gas_price),
				data: Some(data),
			})
			.await?;

		Ok(receipt.nonce)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn swap_output_applies_constant_product_and_fee() {
		let reserves = SwapReserves {
			input_reserve: U256::from(1_000_000u64),
			output_reserve: U256::from(1_000_000u64),
		};

		// Small trade against a deep pool: near 1:1 less the 0.3% fee.
		let out = swap_output(U256::from(1_000u64), &reserves);
		assert!(out <= U256::from(997u64));
		assert!(out >= U256::from(995u64));

		// Minimum output shaves another 1%.
		let min = minimum_output(U256::from(1_000u64), &reserves);
		assert_eq!(min, out * U256::from(99u64) / U256::from(100u64));
	}

	#[test]
	fn empty_pool_quotes_zero() {
		let reserves = SwapReserves {
			input_reserve: U256::ZERO,
			output_reserve: U256::ZERO,
		};
		assert_eq!(swap_output(U256::from(1_000u64), &reserves), U256::ZERO);
	}
}
