//! Normalization and deduplication of transaction records.
//!
//! Raw indexer records fan out into one canonical entity per internal
//! transfer; locally pending entries are matched against the incoming
//! batch and dropped once the chain shows them mined or superseded; the
//! merged history is deduplicated by hash and kept in display order.

use alloy_primitives::U256;
use wallet_types::{
	convert_raw_to_balance_display, convert_raw_to_native_display, Asset, Protocol,
	TransactionKind, TransactionStatus, WalletTransaction,
};

use crate::records::{Direction, NewTransaction, RawStatus, RawTransaction};

/// How many records past the last known confirmed hash are still parsed,
/// covering indexer reordering around the cut point.
const LAST_TX_HASH_BUFFER: usize = 20;

/// Normalizes an indexer batch and merges it with the known history.
///
/// `existing` is the account's current list, pending entries included.
/// `appended` skips the cut at the last confirmed hash (used when paging
/// older history in).
pub fn parse_transactions(
	batch: &[RawTransaction],
	account_address: &str,
	currency_symbol: &str,
	existing: &[WalletTransaction],
	appended: bool,
) -> Vec<WalletTransaction> {
	let data = if appended {
		batch
	} else {
		cut_at_last_confirmed(batch, existing)
	};

	let parsed_new: Vec<WalletTransaction> = data
		.iter()
		.flat_map(|raw| parse_transaction(raw, account_address, currency_symbol))
		.collect();

	let (pending, remaining): (Vec<_>, Vec<_>) =
		existing.iter().cloned().partition(|tx| tx.pending);

	let still_pending = dedupe_pending_transactions(account_address, pending, &parsed_new);

	let mut merged: Vec<WalletTransaction> = Vec::new();
	merged.extend(still_pending);
	merged.extend(parsed_new);
	merged.extend(remaining);

	dedupe_by_hash(&mut merged);
	sort_for_display(&mut merged);
	merged
}

/// Cuts the batch shortly after the most recent hash the history already
/// has confirmed; everything beyond it is already known.
fn cut_at_last_confirmed<'a>(
	batch: &'a [RawTransaction],
	existing: &[WalletTransaction],
) -> &'a [RawTransaction] {
	let last_confirmed = existing.iter().find(|tx| !tx.hash.is_empty() && !tx.pending);
	let Some(last_confirmed) = last_confirmed else {
		return batch;
	};

	let position = batch
		.iter()
		.position(|raw| last_confirmed.hash.starts_with(&raw.hash));
	match position {
		Some(index) => {
			let end = (index + LAST_TX_HASH_BUFFER).min(batch.len());
			&batch[..end]
		}
		None => batch,
	}
}

/// Splits locally pending transactions into those still unaccounted for,
/// dropping any the incoming batch shows as mined or superseded.
///
/// A pending entry is superseded when an incoming record shares its hash
/// prefix, or when the same sender appears with a greater-or-equal nonce
/// (a replacement consumed the nonce).
pub fn dedupe_pending_transactions(
	account_address: &str,
	pending: Vec<WalletTransaction>,
	parsed: &[WalletTransaction],
) -> Vec<WalletTransaction> {
	let account = account_address.to_lowercase();
	pending
		.into_iter()
		.filter(|pending_tx| {
			let pending_hash = pending_tx.network_hash().to_lowercase();
			let superseded = parsed.iter().any(|tx| {
				tx.hash.to_lowercase().starts_with(&pending_hash)
					|| (tx.from.to_lowercase() == account
						&& tx.nonce.is_some()
						&& tx.nonce >= pending_tx.nonce)
			});
			if superseded {
				tracing::debug!(tx_hash = %pending_tx.hash, "Dropping superseded pending transaction");
			}
			!superseded
		})
		.collect()
}

/// Keeps the first occurrence of each hash.
fn dedupe_by_hash(transactions: &mut Vec<WalletTransaction>) {
	let mut seen = std::collections::HashSet::new();
	transactions.retain(|tx| seen.insert(tx.hash.to_lowercase()));
}

/// Display order: pending first, then newest block first; entries from
/// the same block ordered by nonce so the account's own sequence stays
/// monotonic.
fn sort_for_display(transactions: &mut [WalletTransaction]) {
	transactions.sort_by(|a, b| {
		let mined_a = a.mined_at.unwrap_or(u64::MAX);
		let mined_b = b.mined_at.unwrap_or(u64::MAX);
		mined_b
			.cmp(&mined_a)
			.then_with(|| b.nonce.unwrap_or(0).cmp(&a.nonce.unwrap_or(0)))
	});
}

struct InternalChange {
	from: Option<String>,
	to: Option<String>,
	asset: Option<Asset>,
	value: U256,
}

/// Fans one raw record out into canonical entities, one per internal
/// transfer, newest transfer first.
fn parse_transaction(
	raw: &RawTransaction,
	account_address: &str,
	currency_symbol: &str,
) -> Vec<WalletTransaction> {
	let mut failed_override = matches!(raw.status, Some(RawStatus::Failed));

	let mut changes: Vec<InternalChange> = raw
		.changes
		.iter()
		.map(|change| InternalChange {
			from: change.address_from.clone(),
			to: change.address_to.clone(),
			asset: change.asset.as_ref().map(|asset| asset.to_asset()),
			value: change.value,
		})
		.collect();

	if changes.is_empty() {
		match raw.kind {
			// A savings deposit/withdrawal with no transfers reverted on
			// chain even though the broadcast succeeded.
			TransactionKind::Deposit | TransactionKind::Withdraw => {
				failed_override = true;
				changes.push(placeholder_change(raw, None));
			}
			// A failed outgoing contract call still deserves a row.
			TransactionKind::Execution
				if failed_override && raw.direction == Some(Direction::Out) =>
			{
				changes.push(placeholder_change(raw, Some(ether_placeholder())));
			}
			TransactionKind::Authorize => {
				changes.push(placeholder_change(raw, None));
			}
			// A zero-amount self-send is a cancel, not a transfer.
			TransactionKind::Cancel => {
				changes.push(placeholder_change(raw, Some(ether_placeholder())));
			}
			_ => {}
		}
	}

	let mut parsed: Vec<WalletTransaction> = changes
		.iter()
		.enumerate()
		.map(|(index, change)| {
			let status = derive_status(
				raw,
				change,
				account_address,
				failed_override,
			);
			let native_display = change
				.asset
				.as_ref()
				.map(|asset| {
					convert_raw_to_native_display(
						change.value,
						asset.decimals,
						asset.price_unit,
						currency_symbol,
					)
				})
				.unwrap_or_default();
			let balance_display = change
				.asset
				.as_ref()
				.map(|asset| convert_raw_to_balance_display(change.value, asset))
				.unwrap_or_default();

			WalletTransaction {
				hash: format!("{}-{}", raw.hash, index),
				from: change
					.from
					.clone()
					.or_else(|| raw.address_from.clone())
					.unwrap_or_default(),
				to: change
					.to
					.clone()
					.or_else(|| raw.address_to.clone())
					.unwrap_or_default(),
				nonce: raw.nonce,
				status,
				kind: raw.kind,
				protocol: raw.protocol,
				pending: false,
				mined_at: raw.mined_at,
				asset: change.asset.clone(),
				value: change.value,
				balance_display,
				native_display,
				gas_limit: None,
				gas_price: None,
				data: None,
			}
		})
		.collect();

	parsed.reverse();
	parsed
}

fn placeholder_change(raw: &RawTransaction, asset: Option<Asset>) -> InternalChange {
	InternalChange {
		from: raw.address_from.clone(),
		to: raw.address_to.clone(),
		asset,
		value: U256::ZERO,
	}
}

fn ether_placeholder() -> Asset {
	Asset::ether(U256::ZERO, Default::default())
}

/// Maps a record onto a display status from its direction, kind,
/// protocol, and final state.
fn derive_status(
	raw: &RawTransaction,
	change: &InternalChange,
	account_address: &str,
	failed: bool,
) -> TransactionStatus {
	let account = account_address.to_lowercase();
	let is_from_account = change
		.from
		.as_deref()
		.or(raw.address_from.as_deref())
		.map(|from| from.to_lowercase() == account)
		.unwrap_or(false);
	let is_to_account = change
		.to
		.as_deref()
		.or(raw.address_to.as_deref())
		.map(|to| to.to_lowercase() == account)
		.unwrap_or(false);

	if failed {
		return TransactionStatus::Failed;
	}

	match raw.kind {
		TransactionKind::Trade => TransactionStatus::Swapped,
		TransactionKind::Authorize => TransactionStatus::Approved,
		TransactionKind::Purchase => TransactionStatus::Purchased,
		TransactionKind::Deposit => match raw.protocol {
			Some(Protocol::Compound) => TransactionStatus::Deposited,
			_ => TransactionStatus::Sent,
		},
		TransactionKind::Withdraw => match raw.protocol {
			Some(Protocol::Compound) => TransactionStatus::Withdrew,
			_ => TransactionStatus::Received,
		},
		_ if is_from_account && is_to_account => TransactionStatus::SelfTransfer,
		_ if is_from_account => TransactionStatus::Sent,
		_ if is_to_account => TransactionStatus::Received,
		_ => TransactionStatus::Unknown,
	}
}

/// Builds the pending entity for a freshly broadcast transaction.
///
/// The status defaults to the in-flight verb for the operation kind when
/// the caller does not supply one.
pub fn parse_new_transaction(details: &NewTransaction, currency_symbol: &str) -> WalletTransaction {
	let status = details.status.unwrap_or(match details.kind {
		TransactionKind::Authorize => TransactionStatus::Approving,
		TransactionKind::Cancel => TransactionStatus::Cancelling,
		TransactionKind::Deposit => TransactionStatus::Depositing,
		TransactionKind::Purchase => TransactionStatus::Purchasing,
		TransactionKind::Receive => TransactionStatus::Receiving,
		TransactionKind::Trade => TransactionStatus::Swapping,
		TransactionKind::Withdraw => TransactionStatus::Withdrawing,
		TransactionKind::Send | TransactionKind::Execution => TransactionStatus::Sending,
	});

	let native_display = details
		.asset
		.as_ref()
		.map(|asset| {
			convert_raw_to_native_display(
				details.amount,
				asset.decimals,
				asset.price_unit,
				currency_symbol,
			)
		})
		.unwrap_or_default();
	let balance_display = details
		.asset
		.as_ref()
		.map(|asset| convert_raw_to_balance_display(details.amount, asset))
		.unwrap_or_default();

	WalletTransaction {
		hash: details.hash.clone(),
		from: details.from.clone(),
		to: details.to.clone(),
		nonce: details.nonce,
		status,
		kind: details.kind,
		protocol: details.protocol,
		pending: true,
		mined_at: None,
		asset: details.asset.clone(),
		value: details.amount,
		balance_display,
		native_display,
		gas_limit: details.gas_limit,
		gas_price: details.gas_price,
		data: details.data.clone(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::records::RawAsset;

	const ACCOUNT: &str = "0xaaaa000000000000000000000000000000000001";
	const OTHER: &str = "0xbbbb000000000000000000000000000000000002";

	fn dai() -> RawAsset {
		RawAsset {
			asset_code: "0xDAI0000000000000000000000000000000000001".to_string(),
			name: "Dai".to_string(),
			symbol: "dai".to_string(),
			decimals: 18,
			price: Some("1".parse().unwrap()),
		}
	}

	fn raw_send(hash: &str, nonce: u64, mined_at: u64) -> RawTransaction {
		RawTransaction {
			hash: hash.to_string(),
			nonce: Some(nonce),
			address_from: Some(ACCOUNT.to_string()),
			address_to: Some(OTHER.to_string()),
			mined_at: Some(mined_at),
			status: Some(RawStatus::Confirmed),
			kind: TransactionKind::Send,
			direction: Some(Direction::Out),
			protocol: None,
			changes: vec![crate::records::RawChange {
				address_from: Some(ACCOUNT.to_string()),
				address_to: Some(OTHER.to_string()),
				asset: Some(dai()),
				value: U256::from(1_000_000_000_000_000_000u128),
				direction: Some(Direction::Out),
			}],
		}
	}

	fn pending_local(hash: &str, nonce: u64) -> WalletTransaction {
		parse_new_transaction(
			&NewTransaction {
				hash: hash.to_string(),
				from: ACCOUNT.to_string(),
				to: OTHER.to_string(),
				nonce: Some(nonce),
				kind: TransactionKind::Send,
				protocol: None,
				status: None,
				asset: None,
				amount: U256::ZERO,
				gas_limit: None,
				gas_price: None,
				data: None,
			},
			"$",
		)
	}

	#[test]
	fn incoming_hash_prefix_supersedes_pending_entry() {
		let pending = pending_local("0xabc", 1);
		let parsed = parse_transactions(&[raw_send("0xabc", 1, 100)], ACCOUNT, "$", &[pending], false);

		assert_eq!(parsed.len(), 1);
		assert_eq!(parsed[0].hash, "0xabc-0");
		assert!(!parsed[0].pending);
	}

	#[test]
	fn equal_or_higher_nonce_from_account_supersedes_pending() {
		// Replacement with a different hash but the same nonce.
		let pending = pending_local("0xdead", 5);
		let parsed = parse_transactions(&[raw_send("0xbeef", 5, 100)], ACCOUNT, "$", &[pending], false);

		assert_eq!(parsed.len(), 1);
		assert_eq!(parsed[0].hash, "0xbeef-0");
	}

	#[test]
	fn lower_nonce_does_not_supersede_pending() {
		let pending = pending_local("0xdead", 9);
		let parsed = parse_transactions(&[raw_send("0xbeef", 5, 100)], ACCOUNT, "$", &[pending], false);

		assert_eq!(parsed.len(), 2);
		assert!(parsed.iter().any(|tx| tx.hash == "0xdead" && tx.pending));
	}

	#[test]
	fn merged_history_is_deduped_and_ordered() {
		let existing = vec![parse_transaction(&raw_send("0xold", 1, 50), ACCOUNT, "$")
			.pop()
			.unwrap()];

		// Same block, different nonces, plus a duplicate of the known tx.
		let batch = vec![
			raw_send("0xold", 1, 50),
			raw_send("0xnew1", 2, 100),
			raw_send("0xnew2", 3, 100),
		];
		let parsed = parse_transactions(&batch, ACCOUNT, "$", &existing, false);

		let hashes: Vec<_> = parsed.iter().map(|tx| tx.hash.as_str()).collect();
		assert_eq!(hashes, vec!["0xnew2-0", "0xnew1-0", "0xold-0"]);
	}

	#[test]
	fn pending_entries_sort_before_mined_ones() {
		let pending = pending_local("0xpending", 9);
		let parsed = parse_transactions(&[raw_send("0xmined", 1, 100)], ACCOUNT, "$", &[pending], false);

		assert_eq!(parsed[0].hash, "0xpending");
		assert_eq!(parsed[1].hash, "0xmined-0");
	}

	#[test]
	fn empty_deposit_changes_mean_on_chain_failure() {
		let raw = RawTransaction {
			hash: "0xdep".to_string(),
			nonce: Some(4),
			address_from: Some(ACCOUNT.to_string()),
			address_to: Some(OTHER.to_string()),
			mined_at: Some(100),
			status: Some(RawStatus::Confirmed),
			kind: TransactionKind::Deposit,
			direction: Some(Direction::Out),
			protocol: Some(Protocol::Compound),
			changes: vec![],
		};

		let parsed = parse_transaction(&raw, ACCOUNT, "$");
		assert_eq!(parsed.len(), 1);
		assert_eq!(parsed[0].status, TransactionStatus::Failed);
	}

	#[test]
	fn status_mapping_accounts_for_direction_and_protocol() {
		let mut deposit = raw_send("0xdep", 1, 100);
		deposit.kind = TransactionKind::Deposit;
		deposit.protocol = Some(Protocol::Compound);
		assert_eq!(
			parse_transaction(&deposit, ACCOUNT, "$")[0].status,
			TransactionStatus::Deposited
		);

		let mut received = raw_send("0xin", 1, 100);
		received.changes[0].address_from = Some(OTHER.to_string());
		received.changes[0].address_to = Some(ACCOUNT.to_string());
		received.kind = TransactionKind::Receive;
		assert_eq!(
			parse_transaction(&received, ACCOUNT, "$")[0].status,
			TransactionStatus::Received
		);

		let mut failed = raw_send("0xfail", 1, 100);
		failed.status = Some(RawStatus::Failed);
		assert_eq!(
			parse_transaction(&failed, ACCOUNT, "$")[0].status,
			TransactionStatus::Failed
		);
	}

	#[test]
	fn new_transaction_defaults_to_in_flight_verb() {
		let tx = parse_new_transaction(
			&NewTransaction {
				hash: "0xnew".to_string(),
				from: ACCOUNT.to_string(),
				to: OTHER.to_string(),
				nonce: Some(1),
				kind: TransactionKind::Deposit,
				protocol: Some(Protocol::Compound),
				status: None,
				asset: Some(dai().to_asset()),
				amount: U256::from(2_000_000_000_000_000_000u128),
				gas_limit: Some(420_000),
				gas_price: None,
				data: None,
			},
			"$",
		);

		assert!(tx.pending);
		assert_eq!(tx.status, TransactionStatus::Depositing);
		assert_eq!(tx.balance_display, "2 DAI");
		assert_eq!(tx.native_display, "$2.00");
	}
}
