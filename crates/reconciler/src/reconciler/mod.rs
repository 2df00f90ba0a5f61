//! The app list reconciler.
//!
//! # Purpose
//!
//! Keep one derived app list correct while packages, profiles, pins and
//! suggestions change independently and concurrently.
//!
//! # Mental model
//!
//! * Collaborator pushes become [`Cause`]s fired into one
//!   [`RecomputeTrigger`]. Bursts collapse into a single pending batch.
//! * One run loop per attach drains the trigger, applies queued pin
//!   commands, rebuilds, and publishes a complete [`Snapshot`].
//! * A rebuild reads the latest value of every source (combine-latest); it
//!   never waits for a second source to change.
//!
//! # Invariants
//!
//! * At most one rebuild runs per reconciler at any time.
//! * Published entries are unique by identity, belong to allowed profiles,
//!   and resolved to enabled, eligible entry points in that rebuild.
//! * A persisted pin found invalid in a rebuild is deleted from the pin store
//!   in that same cycle, after the snapshot is published.
//! * A snapshot is only published when no pin command is queued, so every
//!   snapshot published after `pin`/`unpin` returns reflects it.
//!
//! # Lifecycle
//!
//! 1. [`Reconciler::attach`] opens every subscription, spawns the source
//!    pumps and the run loop, and fires the initial full rebuild. Attaching
//!    an attached reconciler does nothing.
//! 2. [`Reconciler::detach`] cancels the generation, closes the trigger and
//!    waits for every task to exit; an in-flight rebuild is dropped
//!    unpublished and all subscriptions are released.
//! 3. Commands issued while detached stay queued until the next attach.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use shelf_primitives::AppIdentity;
use shelf_sources::{CatalogProvider, PinStore, ProfileDirectory, SuggestionFeed};
use shelf_worker::{GenerationClock, GenerationToken, RecomputeTrigger, TaskClass};
use tokio::task::JoinHandle;

use crate::{ConfigError, Result, Snapshot, SnapshotPublisher, SnapshotStream, SourceSet, ViewConfig};

mod cause;
mod gather;
mod pumps;
mod run;

pub(crate) use cause::Cause;

/// Collaborators a reconciler reads from.
#[derive(Clone)]
pub struct Sources {
	pub catalog: Arc<dyn CatalogProvider>,
	pub profiles: Arc<dyn ProfileDirectory>,
	pub pins: Option<Arc<dyn PinStore>>,
	pub suggestions: Option<Arc<dyn SuggestionFeed>>,
}

impl Sources {
	/// Catalog and profiles only; see [`Self::with_pins`] and [`Self::with_suggestions`].
	pub fn new(catalog: Arc<dyn CatalogProvider>, profiles: Arc<dyn ProfileDirectory>) -> Self {
		Self {
			catalog,
			profiles,
			pins: None,
			suggestions: None,
		}
	}

	/// Adds the pin store; views without pins ignore it.
	#[must_use]
	pub fn with_pins(mut self, pins: Arc<dyn PinStore>) -> Self {
		self.pins = Some(pins);
		self
	}

	/// Adds the suggestion feed; views without suggestions ignore it.
	#[must_use]
	pub fn with_suggestions(mut self, suggestions: Arc<dyn SuggestionFeed>) -> Self {
		self.suggestions = Some(suggestions);
		self
	}
}

/// Receipt for a queued pin/unpin command.
///
/// The command is reflected in every snapshot whose
/// [`Snapshot::commands_applied`] is at least [`Self::seq`]. A command whose
/// pin-store write is interrupted by [`Reconciler::detach`] stays queued and is
/// applied again after the next [`Reconciler::attach`]; pin and unpin are
/// idempotent, so a write that did land is harmless to repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandTicket(u64);

impl CommandTicket {
	/// Position of the command in issue order, starting at 1.
	pub fn seq(self) -> u64 {
		self.0
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PinCommand {
	Pin(AppIdentity),
	Unpin(AppIdentity),
}

#[derive(Debug, Default)]
pub(crate) struct CommandQueue {
	next_seq: u64,
	applied: u64,
	pending: VecDeque<(u64, PinCommand)>,
}

/// State shared between the handle, the run loop and the pumps.
pub(crate) struct Shared {
	pub(crate) config: ViewConfig,
	pub(crate) sources: Sources,
	pub(crate) publisher: SnapshotPublisher,
	pub(crate) trigger: RecomputeTrigger<Cause>,
	pub(crate) commands: Mutex<CommandQueue>,
}

enum Registration {
	Detached,
	Attached {
		token: GenerationToken,
		tasks: Vec<JoinHandle<()>>,
	},
}

/// Reconciles one view of the app list.
pub struct Reconciler {
	shared: Arc<Shared>,
	clock: GenerationClock,
	registration: Mutex<Registration>,
}

impl Reconciler {
	/// Creates a detached reconciler. Fails if `config` is inconsistent or
	/// reads a source missing from `sources`.
	pub fn new(config: ViewConfig, sources: Sources) -> Result<Self> {
		config.validate()?;
		let missing = |source_name| ConfigError::MissingSource {
			view: config.name.clone(),
			source_name,
		};
		if config.sources.contains(SourceSet::PINS) && sources.pins.is_none() {
			return Err(missing("pins"));
		}
		if config.sources.contains(SourceSet::SUGGESTIONS) && sources.suggestions.is_none() {
			return Err(missing("suggestions"));
		}

		Ok(Self {
			shared: Arc::new(Shared {
				config,
				sources,
				publisher: SnapshotPublisher::new(),
				trigger: RecomputeTrigger::new(),
				commands: Mutex::new(CommandQueue::default()),
			}),
			clock: GenerationClock::new(),
			registration: Mutex::new(Registration::Detached),
		})
	}

	/// View configuration this reconciler was built with.
	pub fn config(&self) -> &ViewConfig {
		&self.shared.config
	}

	/// Subscribes to snapshots, starting at the current one.
	pub fn observe(&self) -> SnapshotStream {
		self.shared.publisher.subscribe()
	}

	/// Latest published snapshot.
	pub fn current(&self) -> Snapshot {
		self.shared.publisher.current()
	}

	/// Whether a generation is currently running.
	pub fn is_attached(&self) -> bool {
		matches!(*self.registration.lock(), Registration::Attached { .. })
	}

	/// Subscribes to every configured source and starts rebuilding.
	///
	/// Returns false when already attached; no second set of subscriptions
	/// is opened in that case.
	pub fn attach(&self) -> bool {
		let mut registration = self.registration.lock();
		if matches!(*registration, Registration::Attached { .. }) {
			tracing::debug!(view = %self.shared.config.name, "reconciler.attach.skipped");
			return false;
		}

		let token = self.clock.begin();
		self.shared.trigger.reopen();
		let (subscriptions, live) = pumps::Subscriptions::open(&self.shared);
		let mut tasks = pumps::spawn_all(&self.shared, subscriptions, &token);
		tasks.push(shelf_worker::spawn(
			TaskClass::Recompute,
			"reconciler.run",
			run::run(Arc::clone(&self.shared), token.clone(), live),
		));
		self.shared.trigger.fire(Cause::Attach);

		tracing::debug!(view = %self.shared.config.name, generation = token.generation(), "reconciler.attached");
		*registration = Registration::Attached { token, tasks };
		true
	}

	/// Stops rebuilding and releases every subscription.
	///
	/// Returns false when not attached.
	pub async fn detach(&self) -> bool {
		let previous = std::mem::replace(&mut *self.registration.lock(), Registration::Detached);
		let Registration::Attached { token, tasks } = previous else {
			return false;
		};

		token.cancel();
		self.shared.trigger.close();
		for task in tasks {
			if let Err(err) = task.await
				&& err.is_panic()
			{
				tracing::error!(view = %self.shared.config.name, error = %err, "reconciler.task_panicked");
			}
		}
		tracing::debug!(view = %self.shared.config.name, generation = token.generation(), "reconciler.detached");
		true
	}

	/// Pins `identity` (appended to the persisted order) unless already pinned.
	pub fn pin(&self, identity: AppIdentity) -> CommandTicket {
		self.enqueue(PinCommand::Pin(identity))
	}

	/// Unpins `identity` if pinned.
	pub fn unpin(&self, identity: AppIdentity) -> CommandTicket {
		self.enqueue(PinCommand::Unpin(identity))
	}

	fn enqueue(&self, command: PinCommand) -> CommandTicket {
		let seq = {
			let mut queue = self.shared.commands.lock();
			queue.next_seq += 1;
			let seq = queue.next_seq;
			queue.pending.push_back((seq, command));
			seq
		};
		self.shared.trigger.fire(Cause::Command);
		CommandTicket(seq)
	}
}

impl Drop for Reconciler {
	fn drop(&mut self) {
		if let Registration::Attached { token, .. } = &*self.registration.get_mut() {
			token.cancel();
			self.shared.trigger.close();
		}
	}
}
