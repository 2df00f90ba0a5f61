use std::sync::Arc;

use shelf_primitives::{AppEntry, AppIdentity, ProfileInfo, Validity};
use shelf_worker::{GenerationToken, TriggerBatch};
use tracing::Instrument;

use super::cause::{self, Plan, Removal};
use super::gather::{self, LiveInputs};
use super::{Cause, PinCommand, Shared};
use crate::{SourceSet, Validator, assemble};

/// Consecutive rebuilds discarded for queued commands before one is published
/// regardless.
const MAX_SUPERSEDED: u32 = 8;

/// What the run loop remembers between rebuilds of one generation.
#[derive(Default)]
struct LoopState {
	/// Entries of the last completed rebuild.
	last: Option<Vec<AppEntry>>,
	/// Allowed profiles seen by the last rebuild.
	allowed: Vec<ProfileInfo>,
	/// Rebuilds discarded in a row because commands were queued.
	superseded: u32,
}

enum CycleOutcome {
	Published(u64),
	/// Commands were queued during the rebuild; it reruns instead.
	Superseded,
	Cancelled,
}

pub(super) async fn run(shared: Arc<Shared>, token: GenerationToken, live: LiveInputs) {
	let view = shared.config.name.clone();
	let generation = token.generation();
	let mut state = LoopState::default();
	tracing::debug!(%view, generation, "reconciler.run.started");

	loop {
		let batch = tokio::select! {
			biased;
			() = token.cancelled() => break,
			batch = shared.trigger.wait() => match batch {
				Some(batch) => batch,
				None => break,
			},
		};

		let span = tracing::debug_span!("reconciler.cycle", %view, generation);
		let work = cycle(&shared, &token, &live, &mut state, batch).instrument(span);
		let outcome = tokio::select! {
			biased;
			() = token.cancelled() => CycleOutcome::Cancelled,
			outcome = work => outcome,
		};
		match outcome {
			CycleOutcome::Published(version) => tracing::trace!(%view, generation, version, "reconciler.published"),
			CycleOutcome::Superseded => tracing::debug!(%view, generation, "reconciler.cycle.superseded"),
			CycleOutcome::Cancelled => break,
		}
	}

	tracing::debug!(%view, generation, "reconciler.run.stopped");
}

async fn cycle(
	shared: &Shared,
	token: &GenerationToken,
	live: &LiveInputs,
	state: &mut LoopState,
	batch: TriggerBatch<Cause>,
) -> CycleOutcome {
	tracing::trace!(causes = ?batch.causes, overflowed = batch.overflowed, "reconciler.cycle.begin");
	apply_commands(shared).await;

	let incremental = match cause::plan(shared, &batch, state.last.is_some()).await {
		Plan::Incremental(removals) => filter_previous(shared, live, state, &removals).await,
		Plan::Full => None,
	};
	let (entries, stale) = match incremental {
		Some(rebuilt) => rebuilt,
		None => {
			let gathered = gather::gather(shared, live, &mut state.allowed).await;
			let entries = assemble(&shared.config, &gathered.inputs);
			let stats = gathered.stats;
			tracing::debug!(
				entries = entries.len(),
				catalog = stats.catalog,
				pins = stats.pins,
				suggestions = stats.suggestions,
				skipped = stats.skipped,
				stale = stats.stale,
				degraded = stats.degraded,
				"reconciler.rebuild"
			);
			(entries, gathered.stale)
		}
	};

	if token.is_cancelled() {
		return CycleOutcome::Cancelled;
	}

	let version = {
		let queue = shared.commands.lock();
		if defer_publish(!queue.pending.is_empty(), state.superseded) {
			state.superseded += 1;
			return CycleOutcome::Superseded;
		}
		shared.publisher.publish(token.generation(), queue.applied, entries.clone())
	};
	state.superseded = 0;
	state.last = Some(entries);

	gather::heal(shared, stale).await;
	CycleOutcome::Published(version)
}

/// A rebuild is discarded while commands are queued, unless that already
/// happened [`MAX_SUPERSEDED`] times in a row.
fn defer_publish(commands_pending: bool, superseded: u32) -> bool {
	commands_pending && superseded < MAX_SUPERSEDED
}

/// A popped command whose pin-store write has not finished. Dropping it
/// unfinished puts the command back at the head of the queue.
struct InFlight<'a> {
	shared: &'a Shared,
	command: Option<(u64, PinCommand)>,
}

impl InFlight<'_> {
	fn finish(mut self) {
		if let Some((seq, _)) = self.command.take() {
			self.shared.commands.lock().applied = seq;
		}
	}
}

impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		if let Some((seq, command)) = self.command.take() {
			tracing::debug!(seq, ?command, "reconciler.command.requeued");
			self.shared.commands.lock().pending.push_front((seq, command));
		}
	}
}

/// Applies queued pin commands in issue order.
async fn apply_commands(shared: &Shared) {
	loop {
		let next = shared.commands.lock().pending.pop_front();
		let Some((seq, command)) = next else {
			return;
		};
		let in_flight = InFlight {
			shared,
			command: Some((seq, command.clone())),
		};

		match shared.sources.pins.as_ref() {
			Some(store) => {
				let result = match &command {
					PinCommand::Pin(identity) => store.insert(identity.clone()).await,
					PinCommand::Unpin(identity) => store.delete(identity).await,
				};
				match result {
					Ok(()) => tracing::debug!(seq, ?command, "reconciler.command.applied"),
					Err(err) => tracing::warn!(seq, ?command, error = %err, "reconciler.command.failed"),
				}
			}
			None => tracing::warn!(seq, ?command, "reconciler.command.no_pin_store"),
		}

		in_flight.finish();
	}
}

/// Rebuilds by removing from the previous result. Only valid for plans whose
/// causes purely remove entries.
///
/// Pins of removed packages are re-validated before being healed. Returns
/// `None` when one still resolves, meaning the catalog moved on and only a
/// full rebuild is accurate.
async fn filter_previous(
	shared: &Shared,
	live: &LiveInputs,
	state: &mut LoopState,
	removals: &[Removal],
) -> Option<(Vec<AppEntry>, Vec<AppIdentity>)> {
	let mut candidates = Vec::new();
	if shared.config.sources.contains(SourceSet::PINS) {
		let pins = live.pins();
		for removal in removals {
			if let Removal::Package { package, profile } = removal
				&& state.allowed.iter().any(|info| info.id == *profile)
			{
				candidates.extend(pins.of_package(package, *profile).cloned());
			}
		}
	}

	let validator = Validator::new(shared.sources.catalog.as_ref());
	let mut stale = Vec::with_capacity(candidates.len());
	for identity in candidates {
		match validator.validate(&identity).await {
			Ok(Validity::Invalid(reason)) => {
				tracing::debug!(%identity, %reason, "reconciler.pin_invalid");
				stale.push(identity);
			}
			Ok(Validity::Valid { .. }) => {
				tracing::debug!(%identity, "reconciler.rebuild.incremental_abandoned");
				return None;
			}
			Err(err) => tracing::debug!(%identity, error = %err, "reconciler.pin_state_unknown"),
		}
	}

	for removal in removals {
		if let Removal::Profile(profile) = removal {
			state.allowed.retain(|info| info.id != *profile);
		}
	}
	let mut entries = state.last.clone().unwrap_or_default();
	entries.retain(|entry| !removals.iter().any(|removal| removal.drops(&entry.identity)));
	tracing::debug!(entries = entries.len(), removals = removals.len(), "reconciler.rebuild.incremental");
	Some((entries, stale))
}
