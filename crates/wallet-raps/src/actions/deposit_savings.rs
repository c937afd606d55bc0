//! Savings deposit action (Compound-style mint).
//!
//! Deposits into a yield-bearing position. A native-asset deposit calls
//! the payable mint with the amount as transaction value; a token
//! deposit passes the amount as a mint argument. The two paths carry
//! distinct fixed gas limits.

use alloy_primitives::U256;
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use wallet_signer::TransactionRequest;
use wallet_txs::NewTransaction;
use wallet_types::{
	Asset, Protocol, TransactionKind, GAS_LIMIT_DEPOSIT, GAS_LIMIT_DEPOSIT_ETH,
};

use super::{action_nonce, encode_call_data, gas_price_wei};
use crate::{RapAction, RapActionParameters, RapContext, RapError};

mod token_market {
	use alloy_sol_types::sol;
	sol! {
		function mint(uint256 mintAmount) external returns (uint256);
	}
}

sol! {
	function mint() external payable;
}

/// Gas limit for a deposit of the given asset.
pub fn deposit_gas_limit(asset: &Asset) -> u64 {
	if asset.is_native() {
		GAS_LIMIT_DEPOSIT_ETH
	} else {
		GAS_LIMIT_DEPOSIT
	}
}

/// Deposits into the savings contract named by `contract_address`.
///
/// When the rap swapped first, the deposit consumes the swap's output
/// asset and amount; otherwise the rap's input.
pub struct DepositSavings;

#[async_trait]
impl RapAction for DepositSavings {
	fn name(&self) -> &'static str {
		"deposit_savings"
	}

	async fn execute(
		&self,
		ctx: &RapContext,
		index: usize,
		parameters: &RapActionParameters,
		base_nonce: Option<u64>,
	) -> Result<u64, RapError> {
		let token = parameters
			.output_asset
			.as_ref()
			.or(parameters.input_asset.as_ref())
			.ok_or(RapError::MissingParameter("input_asset"))?;
		let amount = parameters
			.output_amount
			.or(parameters.input_amount)
			.ok_or(RapError::MissingParameter("input_amount"))?;
		let savings_contract = parameters
			.contract_address
			.as_deref()
			.ok_or(RapError::MissingParameter("contract_address"))?;

		let gas_price = gas_price_wei(ctx).await?;
		let gas_limit = deposit_gas_limit(token);

		let (data, value) = if token.is_native() {
			(encode_call_data(mintCall {}.abi_encode()), amount)
		} else {
			(
				encode_call_data(token_market::mintCall { mintAmount: amount }.abi_encode()),
				U256::ZERO,
			)
		};

		let request = TransactionRequest {
			to: savings_contract.to_string(),
			value,
			data: Some(data.clone()),
			gas_limit: Some(gas_limit),
			gas_price: Some(gas_price),
			nonce: action_nonce(base_nonce, index),
		};

		let receipt = ctx.signer.sign_and_broadcast(request).await?;
		tracing::info!(tx_hash = %receipt.hash, nonce = receipt.nonce, "Deposit broadcast");

		// Register before returning so the watcher tracks the deposit
		// even if the pipeline dies right after this step.
		ctx.transactions
			.add_transaction(&NewTransaction {
				hash: receipt.hash.clone(),
				from: ctx.transactions.account_address().to_string(),
				to: receipt.to,
				nonce: Some(receipt.nonce),
				kind: TransactionKind::Deposit,
				protocol: Some(Protocol::Compound),
				status: None,
				asset: Some(token.clone()),
				amount,
				gas_limit: Some(gas_limit),
				gas_price: Some(gas_price),
				data: Some(data),
			})
			.await?;

		Ok(receipt.nonce)
	}
}
