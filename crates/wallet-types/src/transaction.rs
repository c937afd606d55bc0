//! Canonical transaction entity and its classification enums.
//!
//! A [`WalletTransaction`] is created by the normalizer either from a
//! freshly broadcast transaction (carrying an in-flight status verb) or
//! from an indexer record (status derived from direction, kind, and
//! protocol). The pending watcher flips it to a completed verb once the
//! network reports a block number; speed-up and cancel flows swap its hash
//! and status. Records are removed only by explicit history clearing.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::asset::Asset;

/// Display status of a transaction, as a verb.
///
/// In-flight verbs (e.g. `Depositing`) belong to pending transactions;
/// past-tense verbs belong to confirmed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
	Approved,
	Approving,
	Cancelling,
	Deposited,
	Depositing,
	Failed,
	Purchased,
	Purchasing,
	Received,
	Receiving,
	SelfTransfer,
	Sending,
	Sent,
	SpeedingUp,
	Swapped,
	Swapping,
	Unknown,
	Withdrawing,
	Withdrew,
}

/// The kind of on-chain operation a transaction performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
	Authorize,
	Cancel,
	Deposit,
	Execution,
	Purchase,
	Receive,
	Send,
	Trade,
	Withdraw,
}

/// Protocol a transaction interacted with, when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
	Compound,
	Uniswap,
}

impl Protocol {
	/// Human-readable protocol name.
	pub fn display_name(&self) -> &'static str {
		match self {
			Protocol::Compound => "Compound",
			Protocol::Uniswap => "Uniswap",
		}
	}
}

/// Canonical transaction entity owned by an account's transaction list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTransaction {
	/// Transaction hash; indexer-derived records carry a `-{index}`
	/// suffix distinguishing the internal transfers of one transaction.
	pub hash: String,
	pub from: String,
	pub to: String,
	pub nonce: Option<u64>,
	pub status: TransactionStatus,
	pub kind: TransactionKind,
	pub protocol: Option<Protocol>,
	/// Broadcast but not yet included in a block.
	pub pending: bool,
	/// Unix seconds of the including block, once mined.
	pub mined_at: Option<u64>,
	pub asset: Option<Asset>,
	/// Transferred amount in the asset's raw units.
	pub value: U256,
	/// Human-readable amount, e.g. "1.5 DAI".
	pub balance_display: String,
	/// Amount in the user's native currency, e.g. "$12.34".
	pub native_display: String,
	pub gas_limit: Option<u64>,
	pub gas_price: Option<U256>,
	/// Call data, kept so a speed-up can rebroadcast the same call.
	pub data: Option<String>,
}

impl WalletTransaction {
	/// The on-chain hash without any internal-transfer suffix.
	pub fn network_hash(&self) -> &str {
		self.hash.split('-').next().unwrap_or(&self.hash)
	}
}
