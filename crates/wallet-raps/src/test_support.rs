//! Shared fixtures for the rap tests: a static oracle, mock chain and
//! signer adapters, and a fully wired context over in-memory services.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use wallet_gas::{EtherscanPrices, GasError, GasOracleInterface, GasService, OraclePayload};
use wallet_rpc::implementations::mock::MockChain;
use wallet_rpc::RpcService;
use wallet_signer::implementations::local::LocalSigner;
use wallet_signer::{BroadcastReceipt, SignerError, SignerInterface, SignerService, TransactionRequest};
use wallet_storage::implementations::memory::MemoryStorage;
use wallet_storage::StorageService;
use wallet_txs::TransactionService;

use crate::RapContext;

pub(crate) const ACCOUNT: &str = "0xaaaa000000000000000000000000000000000001";

pub(crate) struct StaticOracle;

#[async_trait]
impl GasOracleInterface for StaticOracle {
	async fn fetch_prices(&self) -> Result<OraclePayload, GasError> {
		Ok(OraclePayload::Etherscan(EtherscanPrices {
			fast: "20".parse().unwrap(),
			average: "10".parse().unwrap(),
			safe_low: "8".parse().unwrap(),
			fast_wait_minutes: "0.5".parse().unwrap(),
			avg_wait_minutes: "3".parse().unwrap(),
			safe_low_wait_minutes: "10".parse().unwrap(),
		}))
	}

	async fn estimated_wait_for_price(
		&self,
		_gwei: rust_decimal::Decimal,
	) -> Result<u64, GasError> {
		Ok(120_000)
	}
}

/// RpcInterface adapter so tests keep a handle on the mock chain after
/// the service takes ownership of the boxed interface.
pub(crate) struct SharedChain(pub Arc<MockChain>);

#[async_trait]
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

/// SignerInterface adapter with the same purpose as [`SharedChain`].
pub(crate) struct SharedSigner(pub Arc<LocalSigner>);

#[async_trait]
impl SignerInterface for SharedSigner {
	async fn address(&self) -> Result<String, SignerError> {
		self.0.address().await
	}

	async fn sign_and_broadcast(
		&self,
		request: TransactionRequest,
	) -> Result<BroadcastReceipt, SignerError> {
		self.0.sign_and_broadcast(request).await
	}
}

/// A wired context plus handles on its mock chain and local signer.
pub(crate) struct Harness {
	pub ctx: RapContext,
	pub chain: Arc<MockChain>,
	pub signer: Arc<LocalSigner>,
}

/// Builds a context over in-memory services with gas prices loaded.
pub(crate) async fn harness() -> Harness {
	let chain = Arc::new(MockChain::new());
	let signer = Arc::new(LocalSigner::new(ACCOUNT, 0));
	let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
	let rpc = Arc::new(RpcService::new(Box::new(SharedChain(Arc::clone(&chain)))));
	let gas = Arc::new(GasService::new(
		Box::new(StaticOracle),
		Box::new(StaticOracle),
		Duration::from_secs(15),
		21_000,
		"$",
	));
	gas.fetch_prices().await.unwrap();

	let ctx = RapContext {
		signer: Arc::new(SignerService::new(Box::new(SharedSigner(Arc::clone(
			&signer,
		))))),
		rpc: Arc::clone(&rpc),
		gas,
		transactions: Arc::new(TransactionService::new(
			ACCOUNT,
			"mainnet",
			"$",
			storage,
			rpc,
			Duration::from_millis(1_000),
		)),
	};

	Harness { ctx, chain, signer }
}
