//! Multi-step transaction pipeline ("rap") for the wallet engine.
//!
//! A rap is one user-initiated sequence of dependent on-chain steps,
//! e.g. approve a token and then deposit it. The engine allocates a
//! single base nonce for the whole pipeline, runs the steps strictly in
//! order, and aborts on the first broadcast failure; already-broadcast
//! steps cannot be rolled back. Each step is a [`RapAction`] trait
//! object; the engine never inspects the concrete kind.

use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use thiserror::Error;
use wallet_gas::GasService;
use wallet_rpc::RpcService;
use wallet_signer::SignerService;
use wallet_txs::TransactionService;
use wallet_types::Asset;

pub mod actions;
pub mod engine;
pub mod replace;

#[cfg(test)]
pub(crate) mod test_support;

pub use actions::{swap_and_deposit, unlock_and_swap, DepositPool, DepositSavings, Swap, Unlock};
pub use engine::RapEngine;
pub use replace::{cancel, min_replacement_price, speed_up};

/// Errors that can occur while executing a rap.
#[derive(Debug, Error)]
pub enum RapError {
	/// Signing or broadcast failed.
	#[error("Signer error: {0}")]
	Signer(#[from] wallet_signer::SignerError),
	/// A network read failed.
	#[error("RPC error: {0}")]
	Rpc(#[from] wallet_rpc::RpcError),
	/// Registering a pending transaction failed.
	#[error("Transaction error: {0}")]
	Transaction(#[from] wallet_txs::TransactionError),
	/// Neither a selected nor a fast gas price is available.
	#[error("No gas price available")]
	NoGasPrice,
	/// A required parameter was not supplied for this action kind.
	#[error("Missing rap parameter: {0}")]
	MissingParameter(&'static str),
	/// An address parameter could not be parsed.
	#[error("Invalid address '{0}'")]
	InvalidAddress(String),
}

/// Services an action needs to build, broadcast, and register its
/// transaction.
#[derive(Clone)]
pub struct RapContext {
	pub signer: Arc<SignerService>,
	pub rpc: Arc<RpcService>,
	pub gas: Arc<GasService>,
	pub transactions: Arc<TransactionService>,
}

/// Reserve snapshot of the traded pair, used to bound swap output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapReserves {
	pub input_reserve: U256,
	pub output_reserve: U256,
}

/// Parameter bag shared by every action of one rap.
///
/// Each action kind reads the fields it needs and ignores the rest; the
/// bag is passed unchanged down the whole pipeline.
#[derive(Clone, Default)]
pub struct RapActionParameters {
	/// Amount entering the operation, in the input asset's raw units.
	pub input_amount: Option<U256>,
	/// Amount produced by an earlier step, in the output asset's raw units.
	pub output_amount: Option<U256>,
	pub input_asset: Option<Asset>,
	pub output_asset: Option<Asset>,
	/// Contract the operation targets: spender, savings contract, pool,
	/// or exchange, depending on the action kind.
	pub contract_address: Option<String>,
	/// Pair reserves for swap output estimation.
	pub reserves: Option<SwapReserves>,
}

/// Callback invoked exactly once per rap: after the first action's
/// broadcast, or on terminal failure.
pub type RapCallback = Box<dyn FnOnce(bool) + Send>;

/// Execution state of a rap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RapStatus {
	Pending,
	Executing(usize),
	Completed,
	Failed(usize),
}

/// One user-initiated multi-step operation.
///
/// Owned exclusively by the engine invocation that executes it, and
/// never persisted: a rap interrupted by a restart is abandoned, and its
/// already-broadcast transactions are recovered by the ordinary pending
/// watcher.
pub struct Rap {
	pub id: String,
	actions: Vec<Box<dyn RapAction>>,
	callback: Option<RapCallback>,
	current_index: usize,
	status: RapStatus,
}

impl Rap {
	/// Creates a rap over an ordered action list.
	pub fn new(id: impl Into<String>, actions: Vec<Box<dyn RapAction>>, callback: RapCallback) -> Self {
		Self {
			id: id.into(),
			actions,
			callback: Some(callback),
			current_index: 0,
			status: RapStatus::Pending,
		}
	}

	/// Current execution state.
	pub fn status(&self) -> RapStatus {
		self.status
	}

	/// Index of the action currently (or last) executed.
	pub fn current_index(&self) -> usize {
		self.current_index
	}

	/// Number of actions in the pipeline.
	pub fn len(&self) -> usize {
		self.actions.len()
	}

	/// Whether the pipeline has no actions.
	pub fn is_empty(&self) -> bool {
		self.actions.is_empty()
	}

	pub(crate) fn set_progress(&mut self, index: usize, status: RapStatus) {
		self.current_index = index;
		self.status = status;
	}

	pub(crate) fn action(&self, index: usize) -> &dyn RapAction {
		self.actions[index].as_ref()
	}

	/// Takes the callback; the engine fires it at most once.
	pub(crate) fn take_callback(&mut self) -> Option<RapCallback> {
		self.callback.take()
	}
}

/// Trait defining one step of a rap.
///
/// Implementations build their own transaction (gas limit fixed per
/// kind, gas price from the selected tier else fast, nonce
/// `base_nonce + index` when the engine allocated one), broadcast it,
/// register the pending record so the watcher can track it, and return
/// the broadcast nonce. Broadcast failures must propagate unswallowed.
#[async_trait]
pub trait RapAction: Send + Sync {
	/// Short name for logs.
	fn name(&self) -> &'static str;

	/// Builds, broadcasts, and registers this step's transaction.
	async fn execute(
		&self,
		ctx: &RapContext,
		index: usize,
		parameters: &RapActionParameters,
		base_nonce: Option<u64>,
	) -> Result<u64, RapError>;
}
