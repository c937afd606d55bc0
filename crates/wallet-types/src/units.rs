//! Well-known unit constants.
//!
//! Gas limits are fixed per operation kind rather than estimated per call;
//! the values are generous upper bounds for the contracts each action
//! targets.

/// Sentinel address for the native gas asset.
pub const ETH_ADDRESS: &str = "eth";

/// Wei per gwei.
pub const WEI_PER_GWEI: u64 = 1_000_000_000;

/// Gas limit for a plain value transfer.
pub const GAS_LIMIT_BASIC_TX: u64 = 21_000;

/// Gas limit for an ERC-20 approval.
pub const GAS_LIMIT_APPROVAL: u64 = 250_000;

/// Gas limit for a token deposit into a savings position.
pub const GAS_LIMIT_DEPOSIT: u64 = 420_000;

/// Gas limit for a native-asset deposit into a savings position.
pub const GAS_LIMIT_DEPOSIT_ETH: u64 = 200_000;

/// Gas limit for a liquidity-pool deposit.
pub const GAS_LIMIT_DEPOSIT_POOL: u64 = 250_000;

/// Gas limit for a swap.
pub const GAS_LIMIT_SWAP: u64 = 200_000;
