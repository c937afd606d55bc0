//! The account-scoped transaction service.
//!
//! Sole owner of an account's transaction list. Every update is a
//! read-modify-write of the whole list under one lock, so readers never
//! observe a partially merged history, and every change is persisted
//! before the call returns.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use wallet_rpc::RpcService;
use wallet_storage::StorageService;
use wallet_types::WalletTransaction;

use crate::parser::{parse_new_transaction, parse_transactions};
use crate::records::{NewTransaction, RawTransaction};
use crate::watcher::{self, PendingWatcher};
use crate::TransactionError;

/// State shared between the service and its watcher.
pub(crate) struct TxState {
	pub account_address: String,
	pub network: String,
	pub currency_symbol: String,
	pub storage: Arc<StorageService>,
	pub rpc: Arc<RpcService>,
	pub transactions: RwLock<Vec<WalletTransaction>>,
}

/// Service owning one account's transaction history.
pub struct TransactionService {
	state: Arc<TxState>,
	watcher: PendingWatcher,
}

impl TransactionService {
	/// Creates a service for one account on one network.
	pub fn new(
		account_address: impl Into<String>,
		network: impl Into<String>,
		currency_symbol: impl Into<String>,
		storage: Arc<StorageService>,
		rpc: Arc<RpcService>,
		watcher_interval: Duration,
	) -> Self {
		let state = Arc::new(TxState {
			account_address: account_address.into(),
			network: network.into(),
			currency_symbol: currency_symbol.into(),
			storage,
			rpc,
			transactions: RwLock::new(Vec::new()),
		});
		let watcher = PendingWatcher::new(Arc::clone(&state), watcher_interval);
		Self { state, watcher }
	}

	/// The account this service owns.
	pub fn account_address(&self) -> &str {
		&self.state.account_address
	}

	/// Loads persisted history into memory.
	///
	/// If the loaded history still has pending entries (for example from
	/// a pipeline interrupted by a restart), the watcher is armed so they
	/// are picked up again.
	pub async fn load(&self) -> Result<Vec<WalletTransaction>, TransactionError> {
		let loaded = self
			.state
			.storage
			.get_transactions(&self.state.account_address, &self.state.network)
			.await?;

		let has_pending = loaded.iter().any(|tx| tx.pending);
		*self.state.transactions.write().await = loaded.clone();
		if has_pending {
			self.watcher.start();
		}
		Ok(loaded)
	}

	/// A snapshot of the current list.
	pub async fn transactions(&self) -> Vec<WalletTransaction> {
		self.state.transactions.read().await.clone()
	}

	/// Registers a freshly broadcast transaction as pending, persists the
	/// list, and arms the watcher.
	pub async fn add_transaction(
		&self,
		details: &NewTransaction,
	) -> Result<WalletTransaction, TransactionError> {
		let tx = parse_new_transaction(details, &self.state.currency_symbol);

		{
			let mut transactions = self.state.transactions.write().await;
			transactions.insert(0, tx.clone());
			let snapshot = transactions.clone();
			drop(transactions);
			self.persist(&snapshot).await?;
		}

		tracing::info!(tx_hash = %tx.hash, nonce = ?tx.nonce, "Added pending transaction");
		self.watcher.start();
		Ok(tx)
	}

	/// Merges an indexer batch into the history and persists the result.
	pub async fn receive_transactions(
		&self,
		batch: &[RawTransaction],
		appended: bool,
	) -> Result<Vec<WalletTransaction>, TransactionError> {
		let mut transactions = self.state.transactions.write().await;
		let merged = parse_transactions(
			batch,
			&self.state.account_address,
			&self.state.currency_symbol,
			&transactions,
			appended,
		);
		*transactions = merged.clone();
		drop(transactions);

		self.persist(&merged).await?;
		Ok(merged)
	}

	/// Replaces the entry stored under `original_hash`, for speed-up and
	/// cancel flows that swap a pending transaction's hash and status.
	pub async fn update_transaction(
		&self,
		original_hash: &str,
		updated: WalletTransaction,
	) -> Result<(), TransactionError> {
		let mut transactions = self.state.transactions.write().await;
		let position = transactions
			.iter()
			.position(|tx| tx.hash == original_hash)
			.ok_or_else(|| {
				TransactionError::Malformed(format!("no transaction with hash {}", original_hash))
			})?;
		transactions[position] = updated;
		let snapshot = transactions.clone();
		drop(transactions);

		self.persist(&snapshot).await?;
		self.watcher.start();
		Ok(())
	}

	/// Clears the local history and its persisted copy.
	pub async fn clear(&self) -> Result<(), TransactionError> {
		self.watcher.stop();
		self.state.transactions.write().await.clear();
		self.state
			.storage
			.remove_transactions(&self.state.account_address, &self.state.network)
			.await?;
		Ok(())
	}

	/// Runs one watcher pass; returns `true` when nothing is pending.
	pub async fn watch_pending_once(&self) -> Result<bool, TransactionError> {
		watcher::tick(&self.state).await
	}

	/// Arms the background watcher.
	pub fn start_watching(&self) {
		self.watcher.start();
	}

	/// Disarms the background watcher; a tick in flight completes.
	pub fn stop_watching(&self) {
		self.watcher.stop();
	}

	async fn persist(&self, snapshot: &[WalletTransaction]) -> Result<(), TransactionError> {
		self.state
			.storage
			.save_transactions(snapshot, &self.state.account_address, &self.state.network)
			.await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::U256;
	use wallet_rpc::implementations::mock::MockChain;
	use wallet_storage::implementations::memory::MemoryStorage;
	use wallet_types::{TransactionKind, TransactionStatus};

	const ACCOUNT: &str = "0xaaaa000000000000000000000000000000000001";

	fn new_tx(hash: &str, nonce: u64) -> NewTransaction {
		NewTransaction {
			hash: hash.to_string(),
			from: ACCOUNT.to_string(),
			to: "0xbbbb000000000000000000000000000000000002".to_string(),
			nonce: Some(nonce),
			kind: TransactionKind::Send,
			protocol: None,
			status: None,
			asset: None,
			amount: U256::ZERO,
			gas_limit: Some(21_000),
			gas_price: Some(U256::from(10_000_000_000u64)),
			data: None,
		}
	}

	fn harness() -> (TransactionService, Arc<MockChain>) {
		let chain = Arc::new(MockChain::new());
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let rpc = Arc::new(RpcService::new(Box::new(SharedChain(Arc::clone(&chain)))));
		let service = TransactionService::new(
			ACCOUNT,
			"mainnet",
			"$",
			storage,
			rpc,
			Duration::from_millis(1_000),
		);
		(service, chain)
	}

	/// RpcInterface adapter so tests can keep a handle on the mock chain
	/// after the service takes ownership of the boxed interface.
	struct SharedChain(Arc<MockChain>);

	#[async_trait::async_trait]
	impl wallet_rpc::RpcInterface for SharedChain {
		async fn get_transaction_count(&self, address: &str) -> Result<u64, wallet_rpc::RpcError> {
			self.0.get_transaction_count(address).await
		}

		async fn get_transaction_by_hash(
			&self,
			hash: &str,
		) -> Result<Option<wallet_rpc::TransactionLookup>, wallet_rpc::RpcError> {
			self.0.get_transaction_by_hash(hash).await
		}

		async fn wait_for_transaction(
			&self,
			hash: &str,
		) -> Result<wallet_rpc::Receipt, wallet_rpc::RpcError> {
			self.0.wait_for_transaction(hash).await
		}
	}

	#[tokio::test]
	async fn watcher_confirms_mined_transaction() {
		let (service, chain) = harness();
		service.add_transaction(&new_tx("0xabc", 1)).await.unwrap();

		// Not mined yet: still pending, watcher not done.
		assert!(!service.watch_pending_once().await.unwrap());
		assert!(service.transactions().await[0].pending);

		chain.mine("0xabc", 100).await;
		assert!(service.watch_pending_once().await.unwrap());

		let confirmed = &service.transactions().await[0];
		assert!(!confirmed.pending);
		assert_eq!(confirmed.status, TransactionStatus::Sent);
	}

	#[tokio::test]
	async fn watcher_tick_is_idempotent() {
		let (service, chain) = harness();
		service.add_transaction(&new_tx("0xabc", 1)).await.unwrap();
		chain.mine("0xabc", 100).await;

		service.watch_pending_once().await.unwrap();
		let after_first = service.transactions().await;
		let first_bytes = serde_json::to_vec(&after_first).unwrap();

		service.watch_pending_once().await.unwrap();
		let second_bytes = serde_json::to_vec(&service.transactions().await).unwrap();
		assert_eq!(first_bytes, second_bytes);
	}

	#[tokio::test]
	async fn lookup_errors_leave_transaction_pending() {
		let (service, chain) = harness();
		service.add_transaction(&new_tx("0xabc", 1)).await.unwrap();

		chain.set_failing(true);
		assert!(!service.watch_pending_once().await.unwrap());
		assert!(service.transactions().await[0].pending);
	}

	#[tokio::test]
	async fn suffixed_hash_is_looked_up_by_network_hash() {
		let (service, chain) = harness();
		let mut details = new_tx("0xabc-0", 1);
		details.hash = "0xabc-0".to_string();
		service.add_transaction(&details).await.unwrap();

		chain.mine("0xabc", 100).await;
		assert!(service.watch_pending_once().await.unwrap());
		assert!(!service.transactions().await[0].pending);
	}

	#[tokio::test]
	async fn update_transaction_swaps_hash_for_replacement() {
		let (service, _chain) = harness();
		let original = service.add_transaction(&new_tx("0xoriginal", 7)).await.unwrap();

		let mut replacement = original.clone();
		replacement.hash = "0xfaster".to_string();
		replacement.status = TransactionStatus::SpeedingUp;
		service
			.update_transaction("0xoriginal", replacement)
			.await
			.unwrap();

		let list = service.transactions().await;
		assert_eq!(list.len(), 1);
		assert_eq!(list[0].hash, "0xfaster");
		assert_eq!(list[0].status, TransactionStatus::SpeedingUp);
	}

	#[tokio::test]
	async fn load_restores_persisted_history() {
		let (service, _chain) = harness();
		service.add_transaction(&new_tx("0xabc", 1)).await.unwrap();

		// Drop the in-memory copy and reload from storage.
		*service.state.transactions.write().await = Vec::new();
		let loaded = service.load().await.unwrap();
		assert_eq!(loaded.len(), 1);
		assert_eq!(loaded[0].hash, "0xabc");
	}

	#[tokio::test]
	async fn clear_removes_memory_and_storage() {
		let (service, _chain) = harness();
		service.add_transaction(&new_tx("0xabc", 1)).await.unwrap();

		service.clear().await.unwrap();
		assert!(service.transactions().await.is_empty());
		assert!(service.load().await.unwrap().is_empty());
	}

	#[tokio::test(start_paused = true)]
	async fn background_watcher_confirms_and_stops() {
		let (service, chain) = harness();
		service.add_transaction(&new_tx("0xabc", 1)).await.unwrap();
		chain.mine("0xabc", 100).await;

		// add_transaction armed the watcher; let it run a tick.
		tokio::time::advance(Duration::from_millis(1_100)).await;
		tokio::task::yield_now().await;

		assert!(!service.transactions().await[0].pending);
	}
}
