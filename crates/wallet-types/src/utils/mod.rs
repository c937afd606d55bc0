//! Utility functions shared across the engine crates.

/// Numeric conversions between raw units, gwei, and display values.
pub mod conversion;
/// String and duration formatting helpers.
pub mod formatting;

pub use conversion::{
	convert_raw_to_balance_display, convert_raw_to_native_display, decimal_from_u256, gwei_to_wei,
	raw_to_whole, wei_to_gwei,
};
pub use formatting::{minimal_time_unit_display, with_0x_prefix, without_0x_prefix};
