//! Concrete rap action kinds and their shared plumbing.
//!
//! Every action follows the same lifecycle: resolve a gas price, build
//! kind-specific call data with a fixed gas limit, broadcast through the
//! signer with nonce `base_nonce + index`, and register the pending
//! transaction before returning the broadcast nonce to the engine.

pub mod deposit_pool;
pub mod deposit_savings;
pub mod swap;
pub mod unlock;

pub use deposit_pool::DepositPool;
pub use deposit_savings::DepositSavings;
pub use swap::Swap;
pub use unlock::Unlock;

use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::{Address, U256};

use crate::{RapAction, RapContext, RapError};

/// Ordered actions for a swap, unlocking the input token first when its
/// allowance requires it.
pub fn unlock_and_swap(needs_unlock: bool) -> Vec<Box<dyn RapAction>> {
	let mut actions: Vec<Box<dyn RapAction>> = Vec::new();
	if needs_unlock {
		actions.push(Box::new(Unlock));
	}
	actions.push(Box::new(Swap));
	actions
}

/// Ordered actions for a savings deposit, swapping into the deposit
/// asset first when the input asset differs from it.
pub fn swap_and_deposit(needs_swap: bool) -> Vec<Box<dyn RapAction>> {
	let mut actions: Vec<Box<dyn RapAction>> = Vec::new();
	if needs_swap {
		actions.push(Box::new(Swap));
	}
	actions.push(Box::new(DepositSavings));
	actions
}

/// Nonce for the action at `index`, when the engine allocated a base.
pub(crate) fn action_nonce(base_nonce: Option<u64>, index: usize) -> Option<u64> {
	base_nonce.map(|base| base + index as u64)
}

/// The gas price an action should broadcast with: the selected tier's
/// price, else the fast tier.
pub(crate) async fn gas_price_wei(ctx: &RapContext) -> Result<U256, RapError> {
	ctx.gas
		.price_for_action()
		.await
		.map(|entry| entry.wei)
		.ok_or(RapError::NoGasPrice)
}

pub(crate) fn parse_address(value: &str) -> Result<Address, RapError> {
	value
		.parse()
		.map_err(|_| RapError::InvalidAddress(value.to_string()))
}

/// Call deadline 20 minutes out, in unix seconds.
pub(crate) fn deadline() -> U256 {
	let now = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap_or_default()
		.as_secs();
	U256::from(now + 20 * 60)
}

/// Hex-encodes ABI call data with the 0x prefix the signer expects.
pub(crate) fn encode_call_data(encoded: Vec<u8>) -> String {
	format!("0x{}", hex::encode(encoded))
}
