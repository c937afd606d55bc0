//! Common types module for the wallet transaction engine.
//!
//! This module defines the core data types and structures shared by the
//! gas-pricing, transaction-pipeline, and watcher crates. It provides a
//! centralized location for shared types to ensure consistency across all
//! engine components.

/// Asset types for tokens and the native gas asset.
pub mod asset;
/// Gas price tiers, price tables, and fee estimates.
pub mod gas;
/// Canonical transaction entity and its status/kind/protocol enums.
pub mod transaction;
/// Well-known unit constants (gwei, per-kind gas limits).
pub mod units;
/// Utility functions for numeric conversion and display formatting.
pub mod utils;

// Re-export all types for convenient access
pub use asset::*;
pub use gas::*;
pub use transaction::*;
pub use units::*;
pub use utils::{
	convert_raw_to_balance_display, convert_raw_to_native_display, gwei_to_wei,
	minimal_time_unit_display, raw_to_whole, wei_to_gwei, with_0x_prefix, without_0x_prefix,
};
