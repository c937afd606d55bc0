//! Formatting utilities for hashes, addresses, and wait estimates.

/// Ensures a hex string has a "0x" prefix.
pub fn with_0x_prefix(hex: &str) -> String {
	if hex.starts_with("0x") {
		hex.to_string()
	} else {
		format!("0x{}", hex)
	}
}

/// Strips the "0x" prefix from a hex string, if present.
pub fn without_0x_prefix(hex: &str) -> &str {
	hex.strip_prefix("0x").unwrap_or(hex)
}

/// Formats a millisecond wait estimate with its largest sensible unit,
/// e.g. "~ 30 sec", "~ 2 min", "~ 1 hr".
pub fn minimal_time_unit_display(ms: u64) -> String {
	const MINUTE: u64 = 60_000;
	const HOUR: u64 = 60 * MINUTE;

	if ms >= HOUR {
		format!("~ {} hr", ms / HOUR)
	} else if ms >= MINUTE {
		format!("~ {} min", ms / MINUTE)
	} else {
		format!("~ {} sec", ms / 1_000)
	}
}
