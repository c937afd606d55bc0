//! Liquidity-pool deposit action (Uniswap-style addLiquidity).
//!
//! Supplies the input token to the pool named by `contract_address`,
//! pairing it with the native amount in `output_amount`.

use alloy_primitives::U256;
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use wallet_signer::TransactionRequest;
use wallet_txs::NewTransaction;
use wallet_types::{Protocol, TransactionKind, GAS_LIMIT_DEPOSIT_POOL};

use super::{action_nonce, deadline, encode_call_data, gas_price_wei};
use crate::{RapAction, RapActionParameters, RapContext, RapError};

sol! {
	function addLiquidity(uint256 min_liquidity, uint256 max_tokens, uint256 deadline) external payable returns (uint256);
}

/// Deposits the input token (plus paired native value) into a pool.
pub struct DepositPool;

#[async_trait]
impl RapAction for DepositPool {
	fn name(&self) -> &'static str {
		"deposit_pool"
	}

	async fn execute(
		&self,
		ctx: &RapContext,
		index: usize,
		parameters: &RapActionParameters,
		base_nonce: Option<u64>,
	) -> Result<u64, RapError> {
		let token = parameters
			.input_asset
			.as_ref()
			.ok_or(RapError::MissingParameter("input_asset"))?;
		let amount = parameters
			.input_amount
			.ok_or(RapError::MissingParameter("input_amount"))?;
		let pool = parameters
			.contract_address
			.as_deref()
			.ok_or(RapError::MissingParameter("contract_address"))?;
		// Native value paired with the token side of the deposit.
		let paired_value = parameters.output_amount.unwrap_or(U256::ZERO);

		let gas_price = gas_price_wei(ctx).await?;
		let call = addLiquidityCall {
			min_liquidity: U256::from(1u64),
			max_tokens: amount,
			deadline: deadline(),
		};
		let data = encode_call_data(call.abi_encode());

		let request = TransactionRequest {
			to: pool.to_string(),
			value: paired_value,
			data: Some(data.clone()),
			gas_limit: Some(GAS_LIMIT_DEPOSIT_POOL),
			gas_price: Some(gas_price),
			nonce: action_nonce(base_nonce, index),
		};

		let receipt = ctx.signer.sign_and_broadcast(request).await?;
		tracing::info!(tx_hash = %receipt.hash, nonce = receipt.nonce, "Pool deposit broadcast");

		ctx.transactions
			.add_transaction(&NewTransaction {
				hash: receipt.hash.clone(),
				from: ctx.transactions.account_address().to_string(),
				to: receipt.to,
				nonce: Some(receipt.nonce),
				kind: TransactionKind::Deposit,
				protocol: Some(Protocol::Uniswap),
				status: None,
				asset: Some(token.clone()),
				amount,
				gas_limit: Some(GAS_LIMIT_DEPOSIT_POOL),
				gas_price: Some(gas_price),
				data: Some(data),
			})
			.await?;

		Ok(receipt.nonce)
	}
}
