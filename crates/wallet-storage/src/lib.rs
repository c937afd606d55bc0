//! Storage module for the wallet transaction engine.
//!
//! This module provides opaque key-value persistence for account-scoped
//! data, keyed by account address and network. The engine stores exactly
//! one kind of document today (the transaction list), but the interface
//! stays generic so backends remain interchangeable.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use wallet_types::WalletTransaction;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Trait defining the low-level interface for storage backends.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key, replacing any prior value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}

/// High-level storage service that provides typed operations.
///
/// Wraps a backend and handles JSON round-trips plus the
/// account+network key scheme used by the transaction list.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	/// Stores a serializable value under `namespace:id`.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&key, bytes).await
	}

	/// Retrieves and deserializes a value from `namespace:id`.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let key = format!("{}:{}", namespace, id);
		let bytes = self.backend.get_bytes(&key).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Removes the value stored under `namespace:id`.
	pub async fn remove(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.backend.delete(&key).await
	}

	/// Persists an account's transaction list for a network.
	pub async fn save_transactions(
		&self,
		transactions: &[WalletTransaction],
		account_address: &str,
		network: &str,
	) -> Result<(), StorageError> {
		self.store(
			"transactions",
			&account_key(account_address, network),
			&transactions,
		)
		.await
	}

	/// Loads an account's transaction list for a network.
	///
	/// An account with no saved history gets an empty list, not an error.
	pub async fn get_transactions(
		&self,
		account_address: &str,
		network: &str,
	) -> Result<Vec<WalletTransaction>, StorageError> {
		match self
			.retrieve("transactions", &account_key(account_address, network))
			.await
		{
			Ok(transactions) => Ok(transactions),
			Err(StorageError::NotFound) => Ok(Vec::new()),
			Err(e) => Err(e),
		}
	}

	/// Deletes an account's transaction list for a network.
	pub async fn remove_transactions(
		&self,
		account_address: &str,
		network: &str,
	) -> Result<(), StorageError> {
		self.remove("transactions", &account_key(account_address, network))
			.await
	}
}

fn account_key(account_address: &str, network: &str) -> String {
	format!("{}:{}", account_address.to_lowercase(), network)
}

#[cfg(test)]
mod tests {
	use super::implementations::memory::MemoryStorage;
	use super::*;
	use alloy_primitives::U256;
	use wallet_types::{TransactionKind, TransactionStatus};

	fn tx(hash: &str) -> WalletTransaction {
		WalletTransaction {
			hash: hash.to_string(),
			from: "0xf00".to_string(),
			to: "0xba4".to_string(),
			nonce: Some(1),
			status: TransactionStatus::Sent,
			kind: TransactionKind::Send,
			protocol: None,
			pending: false,
			mined_at: Some(1_600_000_000),
			asset: None,
			value: U256::ZERO,
			balance_display: String::new(),
			native_display: String::new(),
			gas_limit: None,
			gas_price: None,
			data: None,
		}
	}

	#[tokio::test]
	async fn transaction_list_round_trip() {
		let storage = StorageService::new(Box::new(MemoryStorage::new()));
		let list = vec![tx("0xaaa"), tx("0xbbb")];

		storage
			.save_transactions(&list, "0xAccount", "mainnet")
			.await
			.unwrap();

		// Key is case-insensitive on the account address.
		let loaded = storage
			.get_transactions("0xaccount", "mainnet")
			.await
			.unwrap();
		assert_eq!(loaded, list);
	}

	#[tokio::test]
	async fn missing_history_is_empty_not_an_error() {
		let storage = StorageService::new(Box::new(MemoryStorage::new()));
		let loaded = storage.get_transactions("0xnew", "mainnet").await.unwrap();
		assert!(loaded.is_empty());
	}

	#[tokio::test]
	async fn lists_are_scoped_by_network() {
		let storage = StorageService::new(Box::new(MemoryStorage::new()));
		storage
			.save_transactions(&[tx("0xaaa")], "0xacc", "mainnet")
			.await
			.unwrap();

		let other = storage.get_transactions("0xacc", "ropsten").await.unwrap();
		assert!(other.is_empty());
	}
}
