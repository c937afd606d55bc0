//! Signing module for the wallet transaction engine.
//!
//! This module provides the engine's view of the wallet/keychain
//! subsystem: an opaque capability that, given transaction parameters,
//! produces a signed transaction and broadcasts it. Key custody, seed
//! handling, and hardware integration live behind [`SignerInterface`];
//! the engine only ever sees the broadcast result.

use alloy_primitives::U256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during signing and broadcast.
#[derive(Debug, Error)]
pub enum SignerError {
	/// Error that occurs when signing fails or parameters are rejected.
	///
	/// Signers fail closed: stale or inconsistent parameters are an
	/// error, never signed on a best-effort basis.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when the network rejects the broadcast.
	#[error("Broadcast failed: {0}")]
	BroadcastFailed(String),
}

/// Parameters for a transaction to be signed and broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
	pub to: String,
	pub value: U256,
	/// 0x-prefixed call data, if any.
	pub data: Option<String>,
	pub gas_limit: Option<u64>,
	pub gas_price: Option<U256>,
	/// Explicit nonce; when unset the signer assigns the account's next.
	pub nonce: Option<u64>,
}

/// The network's acknowledgement of an accepted broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastReceipt {
	pub hash: String,
	/// The nonce the transaction was accepted with.
	pub nonce: u64,
	pub to: String,
}

/// Trait defining the interface for signer implementations.
///
/// Implementations hold exclusive custody of key material. Broadcast
/// acceptance, not confirmation, completes a call.
#[async_trait]
pub trait SignerInterface: Send + Sync {
	/// The address this signer controls.
	async fn address(&self) -> Result<String, SignerError>;

	/// Signs the transaction and submits it to the network, returning
	/// once the network has accepted the broadcast.
	async fn sign_and_broadcast(
		&self,
		request: TransactionRequest,
	) -> Result<BroadcastReceipt, SignerError>;
}

/// Service that wraps a signer implementation.
pub struct SignerService {
	implementation: Box<dyn SignerInterface>,
}

impl SignerService {
	/// Creates a new SignerService with the specified implementation.
	pub fn new(implementation: Box<dyn SignerInterface>) -> Self {
		Self { implementation }
	}

	/// The address of the managed account.
	pub async fn address(&self) -> Result<String, SignerError> {
		self.implementation.address().await
	}

	/// Signs and broadcasts a transaction through the managed signer.
	pub async fn sign_and_broadcast(
		&self,
		request: TransactionRequest,
	) -> Result<BroadcastReceipt, SignerError> {
		self.implementation.sign_and_broadcast(request).await
	}
}
