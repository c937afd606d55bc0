//! Local signer implementation for development and testing.
//!
//! Produces deterministic transaction hashes (Keccak-256 over the signing
//! payload) and assigns nonces from an in-process counter, so tests can
//! exercise the full broadcast path without a network or real keys.

use crate::{BroadcastReceipt, SignerError, SignerInterface, TransactionRequest};
use async_trait::async_trait;
use sha3::{Digest, Keccak256};
use tokio::sync::Mutex;

/// In-process signer with a deterministic hash function.
///
/// The assigned nonce mirrors network behavior: an explicit request nonce
/// is honored (and the counter advanced past it), otherwise the account's
/// next nonce is used.
pub struct LocalSigner {
	address: String,
	next_nonce: Mutex<u64>,
	/// Every accepted request, in broadcast order.
	submitted: Mutex<Vec<TransactionRequest>>,
}

impl LocalSigner {
	/// Creates a signer for `address` whose first assigned nonce is
	/// `starting_nonce`.
	pub fn new(address: impl Into<String>, starting_nonce: u64) -> Self {
		Self {
			address: address.into(),
			next_nonce: Mutex::new(starting_nonce),
			submitted: Mutex::new(Vec::new()),
		}
	}

	/// Requests accepted so far, in order.
	pub async fn submitted(&self) -> Vec<TransactionRequest> {
		self.submitted.lock().await.clone()
	}

	fn hash_payload(&self, request: &TransactionRequest, nonce: u64) -> String {
		let mut hasher = Keccak256::new();
		hasher.update(self.address.as_bytes());
		hasher.update(nonce.to_be_bytes());
		hasher.update(request.to.as_bytes());
		hasher.update(request.value.to_be_bytes::<32>());
		if let Some(data) = &request.data {
			hasher.update(data.as_bytes());
		}
		format!("0x{}", hex::encode(hasher.finalize()))
	}
}

#[async_trait]
impl SignerInterface for LocalSigner {
	async fn address(&self) -> Result<String, SignerError> {
		Ok(self.address.clone())
	}

	async fn sign_and_broadcast(
		&self,
		request: TransactionRequest,
	) -> Result<BroadcastReceipt, SignerError> {
		if request.to.is_empty() {
			return Err(SignerError::SigningFailed(
				"missing recipient address".to_string(),
			));
		}

		let mut next_nonce = self.next_nonce.lock().await;
		let nonce = request.nonce.unwrap_or(*next_nonce);
		*next_nonce = (*next_nonce).max(nonce + 1);

		let hash = self.hash_payload(&request, nonce);
		let to = request.to.clone();
		self.submitted.lock().await.push(request);

		tracing::debug!(tx_hash = %hash, nonce, "Accepted local broadcast");

		Ok(BroadcastReceipt { hash, nonce, to })
	}
}
