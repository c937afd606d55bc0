//! Raw transaction records as delivered by the chain indexer, and the
//! parameters of a freshly broadcast local transaction.
//!
//! These are the normalizer's two input shapes; nothing else in the
//! engine consumes them directly.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wallet_types::{Asset, Protocol, TransactionKind, TransactionStatus};

/// Transfer direction relative to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
	In,
	Out,
	SelfDirection,
}

/// Final state the indexer reports for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawStatus {
	Confirmed,
	Failed,
	Pending,
}

/// Asset description inside an indexer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAsset {
	pub asset_code: String,
	pub name: String,
	pub symbol: String,
	pub decimals: u8,
	/// Native-currency price of one whole unit, when the indexer knows it.
	pub price: Option<Decimal>,
}

impl RawAsset {
	/// Converts into the engine's asset type (no balance information).
	pub fn to_asset(&self) -> Asset {
		Asset {
			address: self.asset_code.to_lowercase(),
			name: self.name.clone(),
			symbol: self.symbol.to_uppercase(),
			decimals: self.decimals,
			balance: U256::ZERO,
			price_unit: self.price.unwrap_or_default(),
		}
	}
}

/// One internal transfer within a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChange {
	pub address_from: Option<String>,
	pub address_to: Option<String>,
	pub asset: Option<RawAsset>,
	pub value: U256,
	pub direction: Option<Direction>,
}

/// One transaction as reported by the chain indexer.
///
/// A single on-chain transaction can carry several internal transfers
/// (`changes`); the normalizer fans each out into its own entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
	pub hash: String,
	pub nonce: Option<u64>,
	pub address_from: Option<String>,
	pub address_to: Option<String>,
	/// Unix seconds of the including block.
	pub mined_at: Option<u64>,
	pub status: Option<RawStatus>,
	pub kind: TransactionKind,
	pub direction: Option<Direction>,
	pub protocol: Option<Protocol>,
	pub changes: Vec<RawChange>,
}

/// Parameters of a locally broadcast transaction about to enter the
/// pending set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
	pub hash: String,
	pub from: String,
	pub to: String,
	pub nonce: Option<u64>,
	pub kind: TransactionKind,
	pub protocol: Option<Protocol>,
	/// Explicit in-flight verb; derived from `kind` when unset.
	pub status: Option<TransactionStatus>,
	pub asset: Option<Asset>,
	/// Transferred amount in the asset's raw units.
	pub amount: U256,
	pub gas_limit: Option<u64>,
	pub gas_price: Option<U256>,
	/// Call data, kept for replace-by-fee rebroadcasts.
	pub data: Option<String>,
}
