//! Network RPC module for the wallet transaction engine.
//!
//! This module defines the engine's read-side boundary to a blockchain
//! node: nonce queries, transaction lookups, and receipt waits. The
//! write side (broadcast) belongs to the signer, which submits signed
//! transactions itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod mock;
}

/// Errors that can occur during RPC operations.
#[derive(Debug, Error)]
pub enum RpcError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs when a transaction is not known to the node.
	#[error("Transaction not found: {0}")]
	NotFound(String),
}

/// A node's view of a transaction looked up by hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLookup {
	pub hash: String,
	/// The including block, present once the transaction is mined.
	pub block_number: Option<u64>,
}

impl TransactionLookup {
	/// Whether the transaction has been included in a block.
	pub fn is_mined(&self) -> bool {
		self.block_number.is_some()
	}
}

/// Execution receipt for a mined transaction.
///
/// `success` is false for transactions that were mined but reverted;
/// broadcast acceptance alone never guarantees execution success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
	pub hash: String,
	pub block_number: u64,
	pub success: bool,
}

/// Trait defining the interface for node RPC implementations.
#[async_trait]
pub trait RpcInterface: Send + Sync {
	/// Number of transactions the account has sent; the next valid nonce.
	async fn get_transaction_count(&self, address: &str) -> Result<u64, RpcError>;

	/// Looks up a transaction by hash. `Ok(None)` means the node does not
	/// know the hash (dropped, or not yet propagated).
	async fn get_transaction_by_hash(
		&self,
		hash: &str,
	) -> Result<Option<TransactionLookup>, RpcError>;

	/// Blocks until the transaction is mined and returns its receipt.
	async fn wait_for_transaction(&self, hash: &str) -> Result<Receipt, RpcError>;
}

/// Service that wraps a node RPC implementation.
pub struct RpcService {
	implementation: Box<dyn RpcInterface>,
}

impl RpcService {
	/// Creates a new RpcService with the specified implementation.
	pub fn new(implementation: Box<dyn RpcInterface>) -> Self {
		Self { implementation }
	}

	/// The next valid nonce for an address.
	pub async fn get_transaction_count(&self, address: &str) -> Result<u64, RpcError> {
		self.implementation.get_transaction_count(address).await
	}

	/// Looks up a transaction by hash.
	pub async fn get_transaction_by_hash(
		&self,
		hash: &str,
	) -> Result<Option<TransactionLookup>, RpcError> {
		self.implementation.get_transaction_by_hash(hash).await
	}

	/// Waits for a transaction to be mined.
	pub async fn wait_for_transaction(&self, hash: &str) -> Result<Receipt, RpcError> {
		self.implementation.wait_for_transaction(hash).await
	}
}
