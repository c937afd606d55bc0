//! The owned gas price service.
//!
//! Holds the canonical price table, the user's tier selection and gas
//! limit, and the polling task. All mutation goes through this service;
//! readers always observe a fully formed table, never a partial update.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::U256;
use rust_decimal::Decimal;
use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use wallet_types::{
	gwei_to_wei, minimal_time_unit_display, wei_to_gwei, Asset, GasPriceEntry, GasPriceTable,
	GasSpeed, SelectedGasPrice, TxFeeTable,
};

use crate::parser::{parse_gas_prices, parse_tx_fees};
use crate::{GasError, GasOracleInterface};

/// Result of selecting a speed tier: the chosen price with its fee, and
/// whether the payer's balance covers that fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedSelection {
	pub is_sufficient_gas: bool,
	pub selected: SelectedGasPrice,
}

/// Outcome of validating a custom gas price that was not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomPriceCheck {
	/// Price is within the oracle's current band.
	Ok,
	/// Below the slow tier; the transaction may stall.
	BelowSlow,
	/// More than 2.5x the fast tier; almost certainly overpaying.
	AboveFast,
}

#[derive(Default)]
struct GasStore {
	table: Option<GasPriceTable>,
	fees: TxFeeTable,
	selected_speed: Option<GasSpeed>,
	gas_limit: Option<u64>,
	native_asset: Option<Asset>,
	selected: Option<SelectedGasPrice>,
	is_sufficient_gas: bool,
}

struct Inner {
	primary: Box<dyn GasOracleInterface>,
	secondary: Box<dyn GasOracleInterface>,
	poll_interval: Duration,
	default_gas_limit: u64,
	currency_symbol: String,
	store: RwLock<GasStore>,
	/// Bumped on every start/stop; a poll task only applies results while
	/// its captured generation is still current.
	poll_generation: AtomicU64,
	poll_wake: Notify,
}

/// Gas price service owning the table, tier selection, and polling.
pub struct GasService {
	inner: Arc<Inner>,
	poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl GasService {
	/// Creates a service over a primary oracle and a fallback.
	pub fn new(
		primary: Box<dyn GasOracleInterface>,
		secondary: Box<dyn GasOracleInterface>,
		poll_interval: Duration,
		default_gas_limit: u64,
		currency_symbol: impl Into<String>,
	) -> Self {
		Self {
			inner: Arc::new(Inner {
				primary,
				secondary,
				poll_interval,
				default_gas_limit,
				currency_symbol: currency_symbol.into(),
				store: RwLock::new(GasStore {
					selected_speed: Some(GasSpeed::Normal),
					..GasStore::default()
				}),
				poll_generation: AtomicU64::new(0),
				poll_wake: Notify::new(),
			}),
			poll_task: Mutex::new(None),
		}
	}

	/// Starts polling: an immediate fetch, then one fetch per interval
	/// regardless of success or failure. A previous poll task, if any, is
	/// superseded; its in-flight fetch is discarded rather than applied.
	pub fn start_polling(&self) {
		let generation = self.inner.poll_generation.fetch_add(1, Ordering::SeqCst) + 1;
		let inner = Arc::clone(&self.inner);

		let handle = tokio::spawn(async move {
			loop {
				if inner.poll_generation.load(Ordering::SeqCst) != generation {
					break;
				}

				match inner.fetch_table().await {
					Ok(table) => {
						// Discard the result if polling was stopped or
						// restarted while the fetch was in flight.
						if inner.poll_generation.load(Ordering::SeqCst) == generation {
							inner.apply_table(table).await;
						} else {
							tracing::debug!("Discarding gas prices fetched after stop");
							break;
						}
					}
					Err(e) => {
						tracing::warn!(error = %e, "Gas price fetch failed; keeping stale table");
					}
				}

				tokio::select! {
					_ = inner.poll_wake.notified() => {}
					_ = tokio::time::sleep(inner.poll_interval) => {}
				}
			}
		});

		let mut task = self.poll_task.lock().unwrap_or_else(|e| e.into_inner());
		*task = Some(handle);
	}

	/// Stops polling. The next scheduled fetch is cancelled; a fetch
	/// already in flight completes and is discarded.
	pub fn stop_polling(&self) {
		self.inner.poll_generation.fetch_add(1, Ordering::SeqCst);
		self.inner.poll_wake.notify_one();
		let mut task = self.poll_task.lock().unwrap_or_else(|e| e.into_inner());
		*task = None;
	}

	/// One-shot fetch-and-apply, outside the polling cadence.
	pub async fn fetch_prices(&self) -> Result<GasPriceTable, GasError> {
		let table = self.inner.fetch_table().await?;
		Ok(self.inner.apply_table(table).await)
	}

	/// Writes a user-supplied custom price into the table without waiting
	/// for the next poll, looking up its expected confirmation wait from
	/// the oracle.
	pub async fn update_custom_price(&self, gwei: Decimal) -> Result<GasPriceTable, GasError> {
		let wait_ms = match self.inner.primary.estimated_wait_for_price(gwei).await {
			Ok(ms) => ms,
			Err(e) => {
				tracing::warn!(error = %e, "Primary oracle wait estimate failed, falling back");
				self.inner.secondary.estimated_wait_for_price(gwei).await?
			}
		};

		let entry = GasPriceEntry {
			speed: GasSpeed::Custom,
			wei: gwei_to_wei(gwei),
			gwei_display: format!("{} Gwei", gwei.round().normalize()),
			estimated_wait_ms: wait_ms,
			estimated_wait_display: minimal_time_unit_display(wait_ms),
		};

		let mut store = self.inner.store.write().await;
		let table = store.table.as_mut().ok_or(GasError::NoData)?;
		table.set_entry(GasSpeed::Custom, entry);
		let table = table.clone();
		self.inner.recompute(&mut store);
		Ok(table)
	}

	/// Selects a speed tier and recomputes the fee against it.
	///
	/// A `Custom` selection with no custom entry falls back to `Fast`.
	pub async fn select_speed(&self, speed: GasSpeed) -> Result<SpeedSelection, GasError> {
		let mut store = self.inner.store.write().await;
		store.selected_speed = Some(speed);
		self.inner.recompute(&mut store);
		store
			.selected
			.clone()
			.map(|selected| SpeedSelection {
				is_sufficient_gas: store.is_sufficient_gas,
				selected,
			})
			.ok_or(GasError::NoData)
	}

	/// Updates the gas limit (falling back to the default when `None`)
	/// and recomputes all fees.
	pub async fn update_tx_fee(
		&self,
		gas_limit: Option<u64>,
	) -> Result<SpeedSelection, GasError> {
		let mut store = self.inner.store.write().await;
		store.gas_limit = gas_limit;
		self.inner.recompute(&mut store);
		store
			.selected
			.clone()
			.map(|selected| SpeedSelection {
				is_sufficient_gas: store.is_sufficient_gas,
				selected,
			})
			.ok_or(GasError::NoData)
	}

	/// Sets the asset gas is paid in (balance + native price), used for
	/// sufficiency checks and native fee displays.
	pub async fn set_native_asset(&self, asset: Asset) {
		let mut store = self.inner.store.write().await;
		store.native_asset = Some(asset);
		self.inner.recompute(&mut store);
	}

	/// The current table, if any poll or fetch has succeeded.
	pub async fn table(&self) -> Option<GasPriceTable> {
		self.inner.store.read().await.table.clone()
	}

	/// The currently selected price and fee, if computed.
	pub async fn selected(&self) -> Option<SelectedGasPrice> {
		self.inner.store.read().await.selected.clone()
	}

	/// The price a transaction should use right now: the selected entry,
	/// else the fast tier.
	pub async fn price_for_action(&self) -> Option<GasPriceEntry> {
		let store = self.inner.store.read().await;
		store
			.selected
			.as_ref()
			.map(|s| s.entry.clone())
			.or_else(|| store.table.as_ref().and_then(|t| t.fast.clone()))
	}

	/// Validates a custom price before it is committed.
	///
	/// Zero is rejected outright. With a replacement floor (speed-up or
	/// cancel), anything below `max(floor, normal)` is rejected. Inside
	/// the band, prices below slow or above 2.5x fast come back as
	/// warnings the caller may override.
	pub async fn validate_custom_price(
		&self,
		gwei: Decimal,
		floor_gwei: Option<Decimal>,
	) -> Result<CustomPriceCheck, GasError> {
		if gwei.is_zero() {
			return Err(GasError::InvalidCustomPrice(
				"a valid amount is required".to_string(),
			));
		}

		let store = self.inner.store.read().await;
		let table = store.table.as_ref().ok_or(GasError::NoData)?;

		let normal_gwei = table
			.entry(GasSpeed::Normal)
			.or_else(|| table.entry(GasSpeed::Slow))
			.map(|entry| wei_to_gwei(entry.wei))
			.unwrap_or_default();

		if let Some(floor) = floor_gwei {
			let minimum = floor.max(normal_gwei);
			if gwei < minimum {
				return Err(GasError::InvalidCustomPrice(format!(
					"the minimum gas price allowed is {} Gwei",
					minimum.normalize()
				)));
			}
		}

		let wei = gwei_to_wei(gwei);
		if let Some(slow) = table.entry(GasSpeed::Slow) {
			if wei < slow.wei {
				return Ok(CustomPriceCheck::BelowSlow);
			}
		}
		if let Some(fast) = table.entry(GasSpeed::Fast) {
			// Above 2.5x fast, i.e. 2 * price > 5 * fast.
			if wei * U256::from(2) > fast.wei * U256::from(5) {
				return Ok(CustomPriceCheck::AboveFast);
			}
		}
		Ok(CustomPriceCheck::Ok)
	}
}

impl Inner {
	/// Primary oracle with fallback; an error from both leaves the
	/// existing table untouched.
	async fn fetch_table(&self) -> Result<GasPriceTable, GasError> {
		let payload = match self.primary.fetch_prices().await {
			Ok(payload) => payload,
			Err(primary_err) => {
				tracing::warn!(error = %primary_err, "Primary gas oracle failed, falling back");
				match self.secondary.fetch_prices().await {
					Ok(payload) => payload,
					Err(secondary_err) => {
						return Err(GasError::AllSourcesFailed {
							primary: primary_err.to_string(),
							secondary: secondary_err.to_string(),
						})
					}
				}
			}
		};
		Ok(parse_gas_prices(&payload))
	}

	/// Installs a freshly normalized table, carrying over any custom
	/// entry, and recomputes fees.
	async fn apply_table(&self, mut table: GasPriceTable) -> GasPriceTable {
		let mut store = self.store.write().await;
		if let Some(existing) = &store.table {
			table.carry_custom_from(existing);
		}
		store.table = Some(table.clone());
		self.recompute(&mut store);
		table
	}

	/// Rebuilds the fee table and the current selection from the store's
	/// table, gas limit, and native asset.
	fn recompute(&self, store: &mut GasStore) {
		let Some(table) = &store.table else {
			store.selected = None;
			store.is_sufficient_gas = false;
			return;
		};

		let price_unit = store
			.native_asset
			.as_ref()
			.map(|asset| asset.price_unit)
			.unwrap_or_default();
		let gas_limit = store.gas_limit.unwrap_or(self.default_gas_limit);

		store.fees = parse_tx_fees(table, price_unit, gas_limit, &self.currency_symbol);

		let requested = store.selected_speed.unwrap_or(GasSpeed::Normal);
		// A custom selection with no custom price falls back to fast.
		let effective = match table.entry(requested) {
			Some(_) => requested,
			None => GasSpeed::Fast,
		};

		store.selected = match (table.entry(effective), store.fees.fee(effective)) {
			(Some(entry), Some(fee)) => Some(SelectedGasPrice {
				entry: entry.clone(),
				fee: fee.clone(),
			}),
			_ => None,
		};

		store.is_sufficient_gas = match (&store.selected, &store.native_asset) {
			(Some(selected), Some(asset)) => asset.balance >= selected.fee.wei,
			_ => false,
		};
	}
}
