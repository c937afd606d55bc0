//! The rap execution engine.
//!
//! Drives a rap's actions strictly in index order, each awaited to
//! broadcast acceptance before the next starts, since later steps
//! usually depend on chain state changed by earlier ones. One base nonce
//! is read for the whole rap so the steps' nonces are gap-free even
//! though two independently queried nonces could collide.

use crate::{Rap, RapActionParameters, RapContext, RapError, RapStatus};

/// Executes raps against a set of injected services.
///
/// The engine is the sole mutator of rap state; actions only return
/// results. It does not serialize raps against each other: safety across
/// concurrent raps comes from reading the base nonce fresh per rap.
pub struct RapEngine {
	ctx: RapContext,
}

impl RapEngine {
	/// Creates an engine over the given services.
	pub fn new(ctx: RapContext) -> Self {
		Self { ctx }
	}

	/// Runs a rap to completion or first failure.
	///
	/// The rap's callback fires exactly once: after the first action's
	/// broadcast is accepted, or on terminal failure. On failure the
	/// remaining actions are aborted; already-broadcast steps stay out on
	/// the network and are tracked by the pending watcher.
	pub async fn execute(
		&self,
		rap: &mut Rap,
		parameters: &RapActionParameters,
	) -> Result<(), RapError> {
		let base_nonce = self.allocate_base_nonce().await;
		tracing::info!(
			rap_id = %rap.id,
			actions = rap.len(),
			base_nonce = ?base_nonce,
			"Executing rap"
		);

		for index in 0..rap.len() {
			rap.set_progress(index, RapStatus::Executing(index));
			let action_name = rap.action(index).name();
			tracing::info!(
				rap_id = %rap.id,
				action = action_name,
				index,
				"Executing rap action"
			);

			let result = rap
				.action(index)
				.execute(&self.ctx, index, parameters, base_nonce)
				.await;
			match result {
				Ok(nonce) => {
					tracing::info!(
						rap_id = %rap.id,
						action = action_name,
						index,
						nonce,
						"Rap action broadcast"
					);
					if index == 0 {
						Self::fire_callback(rap, true);
					}
				}
				Err(e) => {
					tracing::error!(
						rap_id = %rap.id,
						action = action_name,
						index,
						error = %e,
						"Rap action failed; aborting remaining actions"
					);
					rap.set_progress(index, RapStatus::Failed(index));
					Self::fire_callback(rap, false);
					return Err(e);
				}
			}
		}

		rap.set_progress(rap.len().saturating_sub(1), RapStatus::Completed);
		// A rap with no actions never reached the post-broadcast hook.
		Self::fire_callback(rap, true);
		tracing::info!(rap_id = %rap.id, "Rap complete");
		Ok(())
	}

	/// Reads the account's next nonce once for the whole rap.
	///
	/// When the read fails the rap still runs: actions leave the nonce
	/// unset and the signer assigns sequential nonces itself.
	async fn allocate_base_nonce(&self) -> Option<u64> {
		let address = match self.ctx.signer.address().await {
			Ok(address) => address,
			Err(e) => {
				tracing::warn!(error = %e, "Signer address unavailable; deferring nonces");
				return None;
			}
		};
		match self.ctx.rpc.get_transaction_count(&address).await {
			Ok(nonce) => Some(nonce),
			Err(e) => {
				tracing::warn!(error = %e, "Nonce read failed; deferring to signer assignment");
				None
			}
		}
	}

	fn fire_callback(rap: &mut Rap, success: bool) {
		if let Some(callback) = rap.take_callback() {
			callback(success);
		}
	}
}
