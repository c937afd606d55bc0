//! Pending-transaction watcher.
//!
//! While any local transaction is pending, the watcher polls the network
//! once per interval, confirming entries the chain reports as mined. The
//! re-arm is lazy: the next tick is scheduled only after the previous one
//! fully resolves, so ticks never overlap and at most one timer is ever
//! outstanding. The watcher stops itself once nothing is pending.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use wallet_types::TransactionStatus;

use crate::service::TxState;
use crate::TransactionError;

/// Watcher over an account's pending transactions.
pub struct PendingWatcher {
	state: Arc<TxState>,
	poll_interval: Duration,
	/// Bumped on every start/stop; a running loop exits once its captured
	/// generation is stale, so stop cannot race a tick into re-arming.
	generation: Arc<AtomicU64>,
	task: Mutex<Option<JoinHandle<()>>>,
}

impl PendingWatcher {
	pub(crate) fn new(state: Arc<TxState>, poll_interval: Duration) -> Self {
		Self {
			state,
			poll_interval,
			generation: Arc::new(AtomicU64::new(0)),
			task: Mutex::new(None),
		}
	}

	/// Starts (or restarts) the watch loop.
	pub fn start(&self) {
		let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
		let generation_handle = Arc::clone(&self.generation);
		let state = Arc::clone(&self.state);
		let poll_interval = self.poll_interval;

		let handle = tokio::spawn(async move {
			loop {
				if generation_handle.load(Ordering::SeqCst) != generation {
					break;
				}

				let done = match tick(&state).await {
					Ok(done) => done,
					Err(e) => {
						tracing::warn!(error = %e, "Pending watcher tick failed");
						false
					}
				};
				if done {
					tracing::debug!("No pending transactions remain; watcher stopping");
					break;
				}

				tokio::time::sleep(poll_interval).await;
			}
		});

		let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
		*task = Some(handle);
	}

	/// Prevents the next tick. A tick already in flight completes.
	pub fn stop(&self) {
		self.generation.fetch_add(1, Ordering::SeqCst);
		let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
		*task = None;
	}
}

/// One watcher pass over the pending set.
///
/// Returns `true` when no pending transactions remain. Individual lookup
/// errors leave the transaction pending; a transient RPC failure must
/// never mark anything failed.
pub(crate) async fn tick(state: &TxState) -> Result<bool, TransactionError> {
	let mut transactions = state.transactions.write().await;
	if transactions.is_empty() {
		return Ok(true);
	}

	let mut changed = false;
	for tx in transactions.iter_mut().filter(|tx| tx.pending) {
		let network_hash = tx.network_hash().to_string();
		match state.rpc.get_transaction_by_hash(&network_hash).await {
			Ok(Some(lookup)) if lookup.is_mined() => {
				tx.pending = false;
				tx.status = completed_verb(tx.status);
				changed = true;
				tracing::info!(
					tx_hash = %network_hash,
					block_number = ?lookup.block_number,
					"Transaction confirmed"
				);
			}
			Ok(_) => {}
			Err(e) => {
				tracing::debug!(
					tx_hash = %network_hash,
					error = %e,
					"Pending lookup failed; treating as still pending"
				);
			}
		}
	}

	let done = !transactions.iter().any(|tx| tx.pending);
	if changed {
		let snapshot = transactions.clone();
		drop(transactions);
		state
			.storage
			.save_transactions(&snapshot, &state.account_address, &state.network)
			.await?;
	}
	Ok(done)
}

/// The completed verb for a confirmed transaction's in-flight status.
fn completed_verb(status: TransactionStatus) -> TransactionStatus {
	match status {
		TransactionStatus::Approving => TransactionStatus::Approved,
		TransactionStatus::Depositing => TransactionStatus::Deposited,
		TransactionStatus::Purchasing => TransactionStatus::Purchased,
		TransactionStatus::Receiving => TransactionStatus::Received,
		TransactionStatus::Swapping => TransactionStatus::Swapped,
		TransactionStatus::Withdrawing => TransactionStatus::Withdrew,
		TransactionStatus::Cancelling
		| TransactionStatus::SpeedingUp
		| TransactionStatus::Sending => TransactionStatus::Sent,
		other => other,
	}
}
