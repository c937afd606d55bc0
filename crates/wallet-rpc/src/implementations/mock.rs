//! In-memory mock chain for testing and development.
//!
//! Holds per-address nonces and a hash-keyed set of known transactions.
//! Tests drive chain state directly: `mine` marks a hash as included,
//! `set_failing` makes lookups return transient errors.

use crate::{Receipt, RpcError, RpcInterface, TransactionLookup};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Scriptable in-memory chain state.
#[derive(Default)]
pub struct MockChain {
	nonces: RwLock<HashMap<String, u64>>,
	mined: RwLock<HashMap<String, Receipt>>,
	failing: AtomicBool,
}

impl MockChain {
	/// Creates an empty chain.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the transaction count reported for an address.
	pub async fn set_transaction_count(&self, address: &str, count: u64) {
		self.nonces
			.write()
			.await
			.insert(address.to_lowercase(), count);
	}

	/// Marks a hash as mined in `block_number`.
	pub async fn mine(&self, hash: &str, block_number: u64) {
		self.mine_with_status(hash, block_number, true).await;
	}

	/// Marks a hash as mined with an explicit execution status, for
	/// exercising mined-but-reverted transactions.
	pub async fn mine_with_status(&self, hash: &str, block_number: u64, success: bool) {
		self.mined.write().await.insert(
			hash.to_string(),
			Receipt {
				hash: hash.to_string(),
				block_number,
				success,
			},
		);
	}

	/// Makes every lookup fail with a network error until reset.
	pub fn set_failing(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}

	fn check_failing(&self) -> Result<(), RpcError> {
		if self.failing.load(Ordering::SeqCst) {
			return Err(RpcError::Network("simulated outage".to_string()));
		}
		Ok(())
	}
}

#[async_trait]
impl RpcInterface for MockChain {
	async fn get_transaction_count(&self, address: &str) -> Result<u64, RpcError> {
		self.check_failing()?;
		let nonces = self.nonces.read().await;
		Ok(nonces.get(&address.to_lowercase()).copied().unwrap_or(0))
	}

	async fn get_transaction_by_hash(
		&self,
		hash: &str,
	) -> Result<Option<TransactionLookup>, RpcError> {
		self.check_failing()?;
		let mined = self.mined.read().await;
		Ok(mined.get(hash).map(|receipt| TransactionLookup {
			hash: receipt.hash.clone(),
			block_number: Some(receipt.block_number),
		}))
	}

	async fn wait_for_transaction(&self, hash: &str) -> Result<Receipt, RpcError> {
		self.check_failing()?;
		let mined = self.mined.read().await;
		mined
			.get(hash)
			.cloned()
			.ok_or_else(|| RpcError::NotFound(hash.to_string()))
	}
}
