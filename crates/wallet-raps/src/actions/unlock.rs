//! Token approval ("unlock") action.
//!
//! Grants the target contract an unlimited allowance on the input token
//! so a later step in the same rap can spend it.

use alloy_primitives::U256;
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use wallet_signer::TransactionRequest;
use wallet_txs::NewTransaction;
use wallet_types::{TransactionKind, GAS_LIMIT_APPROVAL};

use super::{action_nonce, encode_call_data, gas_price_wei, parse_address};
use crate::{RapAction, RapActionParameters, RapContext, RapError};

sol! {
	function approve(address spender, uint256 value) external returns (bool);
}

/// Approves the spender named by `contract_address` on the input token.
pub struct Unlock;

#[async_trait]
impl RapAction for Unlock {
	fn name(&self) -> &'static str {
		"unlock"
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
		let spender = parameters
			.contract_address
			.as_deref()
			.ok_or(RapError::MissingParameter("contract_address"))?;

		let gas_price = gas_price_wei(ctx).await?;
		let call = approveCall {
			spender: parse_address(spender)?,
			value: U256::MAX,
		};
		let data = encode_call_data(call.abi_encode());

		let request = TransactionRequest {
			to: token.address.clone(),
			value: U256::ZERO,
			data: Some(data.clone()),
			gas_limit: Some(GAS_LIMIT_APPROVAL),
			gas_price: Some(gas_price),
			nonce: action_nonce(base_nonce, index),
		};

		let receipt = ctx.signer.sign_and_broadcast(request).await?;
		tracing::info!(tx_hash = %receipt.hash, nonce = receipt.nonce, "Unlock broadcast");

		ctx.transactions
			.add_transaction(&NewTransaction {
				hash: receipt.hash.clone(),
				from: ctx.transactions.account_address().to_string(),
				to: receipt.to,
				nonce: Some(receipt.nonce),
				kind: TransactionKind::Authorize,
				protocol: None,
				status: None,
				asset: Some(token.clone()),
				amount: U256::ZERO,
				gas_limit: Some(GAS_LIMIT_APPROVAL),
				gas_price: Some(gas_price),
				data: Some(data),
			})
			.await?;

		Ok(receipt.nonce)
	}
}
