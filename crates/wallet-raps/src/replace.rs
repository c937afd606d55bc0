//! Replace-by-fee flows: speed-up and cancel.
//!
//! A replacement reuses the original transaction's nonce with a price at
//! least 10% above the original, so the network prefers it over the
//! still-pending transaction. Cancel sends zero value back to the
//! account; speed-up rebroadcasts the original call unchanged. On
//! success the local record keeps its place in history with the new hash
//! and an in-flight replacement status.

use alloy_primitives::U256;
use wallet_signer::TransactionRequest;
use wallet_types::{TransactionStatus, WalletTransaction, GAS_LIMIT_BASIC_TX};

use crate::{RapContext, RapError};

/// Lowest price the network will accept for a replacement: 10% above
/// the original's price.
pub fn min_replacement_price(original: U256) -> U256 {
	original * U256::from(110u64) / U256::from(100u64)
}

/// The price a replacement broadcasts with: the currently selected tier
/// if it clears the floor, else the floor itself.
async fn replacement_price(ctx: &RapContext, tx: &WalletTransaction) -> Result<U256, RapError> {
	let original = tx
		.gas_price
		.ok_or(RapError::MissingParameter("gas_price"))?;
	let floor = min_replacement_price(original);
	let selected = ctx
		.gas
		.price_for_action()
		.await
		.map(|entry| entry.wei)
		.unwrap_or(U256::ZERO);
	Ok(selected.max(floor))
}

/// Rebroadcasts `tx` with the same nonce and call data at a higher
/// price, swapping the local record onto the new hash.
pub async fn speed_up(
	ctx: &RapContext,
	tx: &WalletTransaction,
) -> Result<WalletTransaction, RapError> {
	let gas_price = replacement_price(ctx, tx).await?;

	let request = TransactionRequest {
		to: tx.to.clone(),
		value: tx.value,
		data: tx.data.clone(),
		gas_limit: tx.gas_limit,
		gas_price: Some(gas_price),
		nonce: tx.nonce,
	};
	let receipt = ctx.signer.sign_and_broadcast(request).await?;
	tracing::info!(
		original_hash = %tx.hash,
		replacement_hash = %receipt.hash,
		"Speed-up broadcast"
	);

	let mut updated = tx.clone();
	updated.hash = receipt.hash;
	updated.status = TransactionStatus::SpeedingUp;
	updated.gas_price = Some(gas_price);
	updated.pending = true;
	ctx.transactions
		.update_transaction(&tx.hash, updated.clone())
		.await?;
	Ok(updated)
}

/// Replaces `tx` with a zero-value self-send on the same nonce,
/// attempting to cancel it.
pub async fn cancel(
	ctx: &RapContext,
	tx: &WalletTransaction,
) -> Result<WalletTransaction, RapError> {
	let gas_price = replacement_price(ctx, tx).await?;
	let account = ctx.signer.address().await?;

	let request = TransactionRequest {
		to: account,
		value: U256::ZERO,
		data: None,
		gas_limit: Some(GAS_LIMIT_BASIC_TX),
		gas_price: Some(gas_price),
		nonce: tx.nonce,
	};
	let receipt = ctx.signer.sign_and_broadcast(request).await?;
	tracing::info!(
		original_hash = %tx.hash,
		replacement_hash = %receipt.hash,
		"Cancel broadcast"
	);

	let mut updated = tx.clone();
	updated.hash = receipt.hash;
	updated.status = TransactionStatus::Cancelling;
	updated.gas_price = Some(gas_price);
	updated.pending = true;
	ctx.transactions
		.update_transaction(&tx.hash, updated.clone())
		.await?;
	Ok(updated)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{harness, ACCOUNT};
	use wallet_txs::NewTransaction;
	use wallet_types::TransactionKind;

	#[test]
	fn floor_is_ten_percent_above_original() {
		assert_eq!(
			min_replacement_price(U256::from(10_000_000_000u64)),
			U256::from(11_000_000_000u64)
		);
		assert_eq!(min_replacement_price(U256::ZERO), U256::ZERO);
	}

	async fn pending_send(
		ctx: &crate::RapContext,
		gas_price_gwei: u64,
	) -> WalletTransaction {
		ctx.transactions
			.add_transaction(&NewTransaction {
				hash: "0xoriginal".to_string(),
				from: ACCOUNT.to_string(),
				to: "0xbbbb000000000000000000000000000000000002".to_string(),
				nonce: Some(4),
				kind: TransactionKind::Send,
				protocol: None,
				status: None,
				asset: None,
				amount: U256::ZERO,
				gas_limit: Some(GAS_LIMIT_BASIC_TX),
				gas_price: Some(U256::from(gas_price_gwei) * U256::from(1_000_000_000u64)),
				data: Some("0xdeadbeef".to_string()),
			})
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn speed_up_reuses_nonce_and_bumps_price() {
		let harness = harness().await;
		// Original at 20 gwei: the 10% floor (22) beats the selected
		// normal tier (10).
		let original = pending_send(&harness.ctx, 20).await;

		let updated = speed_up(&harness.ctx, &original).await.unwrap();

		assert_ne!(updated.hash, original.hash);
		assert_eq!(updated.status, TransactionStatus::SpeedingUp);
		assert!(updated.pending);
		assert_eq!(updated.gas_price, Some(U256::from(22_000_000_000u64)));

		// The rebroadcast reused the nonce, recipient, and call data.
		let submitted = harness.signer.submitted().await;
		let replacement = submitted.last().unwrap();
		assert_eq!(replacement.nonce, Some(4));
		assert_eq!(replacement.to, original.to);
		assert_eq!(replacement.data.as_deref(), Some("0xdeadbeef"));

		// The local record was swapped onto the new hash.
		let list = harness.ctx.transactions.transactions().await;
		assert_eq!(list.len(), 1);
		assert_eq!(list[0].hash, updated.hash);
	}

	#[tokio::test]
	async fn speed_up_prefers_selected_price_above_floor() {
		let harness = harness().await;
		// Original at 1 gwei: the selected normal tier (10) beats the
		// 10% floor (1.1).
		let original = pending_send(&harness.ctx, 1).await;

		let updated = speed_up(&harness.ctx, &original).await.unwrap();
		assert_eq!(updated.gas_price, Some(U256::from(10_000_000_000u64)));
	}

	#[tokio::test]
	async fn cancel_sends_zero_value_to_self_on_same_nonce() {
		let harness = harness().await;
		let original = pending_send(&harness.ctx, 20).await;

		let updated = cancel(&harness.ctx, &original).await.unwrap();
		assert_eq!(updated.status, TransactionStatus::Cancelling);

		let submitted = harness.signer.submitted().await;
		let replacement = submitted.last().unwrap();
		assert_eq!(replacement.to, ACCOUNT);
		assert_eq!(replacement.value, U256::ZERO);
		assert_eq!(replacement.nonce, Some(4));
		assert!(replacement.data.is_none());
	}

	#[tokio::test]
	async fn replacement_requires_original_gas_price() {
		let harness = harness().await;
		let mut original = pending_send(&harness.ctx, 20).await;
		original.gas_price = None;

		let result = speed_up(&harness.ctx, &original).await;
		assert!(matches!(result, Err(RapError::MissingParameter("gas_price"))));
	}
}
