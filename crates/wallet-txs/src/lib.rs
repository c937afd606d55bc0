//! Transaction pipeline for the wallet transaction engine.
//!
//! This module owns the account's canonical transaction list: it
//! normalizes raw indexer records into [`wallet_types::WalletTransaction`]
//! entities, merges them with locally pending entries (dropping duplicates
//! and superseded transactions), persists the result, and watches pending
//! transactions until the network confirms or replaces them.

use thiserror::Error;

pub mod parser;
pub mod records;
pub mod service;
pub mod watcher;

pub use parser::{dedupe_pending_transactions, parse_new_transaction, parse_transactions};
pub use records::{Direction, NewTransaction, RawAsset, RawChange, RawStatus, RawTransaction};
pub use service::TransactionService;
pub use watcher::PendingWatcher;

/// Errors that can occur in the transaction pipeline.
#[derive(Debug, Error)]
pub enum TransactionError {
	/// Error persisting or loading the transaction list.
	#[error("Storage error: {0}")]
	Storage(#[from] wallet_storage::StorageError),
	/// A record was missing data the normalizer requires.
	#[error("Malformed transaction record: {0}")]
	Malformed(String),
}
