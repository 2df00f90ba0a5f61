use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Causes retained per batch before the batch degrades to "overflowed".
const MAX_CAUSES: usize = 64;

/// Outcome of firing a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
	/// The trigger was idle and is now armed.
	Armed,
	/// A pending trigger absorbed this cause.
	Coalesced,
	/// The trigger is closed; the cause was dropped.
	Closed,
}

/// Everything that fired since the last [`RecomputeTrigger::wait`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerBatch<C> {
	/// Distinct causes in arrival order.
	pub causes: Vec<C>,
	/// More than the retained number of distinct causes fired; consumers
	/// must treat the batch as opaque.
	pub overflowed: bool,
}

struct TriggerState<C> {
	armed: bool,
	closed: bool,
	causes: Vec<C>,
	overflowed: bool,
}

struct TriggerInner<C> {
	state: Mutex<TriggerState<C>>,
	notify: Notify,
}

/// Depth-1 coalescing trigger for a single consumer.
///
/// Any number of fires while the consumer is busy collapse into exactly one
/// pending batch. The pending state never grows beyond one batch of at most
/// `MAX_CAUSES` distinct causes.
pub struct RecomputeTrigger<C> {
	inner: Arc<TriggerInner<C>>,
}

impl<C> Clone for RecomputeTrigger<C> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<C> Default for RecomputeTrigger<C> {
	fn default() -> Self {
		Self::new()
	}
}

impl<C> RecomputeTrigger<C> {
	/// Open trigger with no pending batch.
	pub fn new() -> Self {
		Self {
			inner: Arc::new(TriggerInner {
				state: Mutex::new(TriggerState {
					armed: false,
					closed: false,
					causes: Vec::new(),
					overflowed: false,
				}),
				notify: Notify::new(),
			}),
		}
	}

	/// Closes the trigger. Pending causes are discarded and waiters observe `None`.
	pub fn close(&self) {
		{
			let mut state = self.inner.state.lock();
			state.closed = true;
			state.armed = false;
			state.causes.clear();
		}
		self.inner.notify.notify_waiters();
		self.inner.notify.notify_one();
	}

	/// Reopens a closed trigger with an empty batch.
	pub fn reopen(&self) {
		let mut state = self.inner.state.lock();
		state.closed = false;
		state.armed = false;
		state.overflowed = false;
		state.causes.clear();
	}

	/// Whether a batch is waiting to be taken.
	pub fn is_armed(&self) -> bool {
		self.inner.state.lock().armed
	}

	/// Waits for the next batch. Returns `None` once closed.
	pub async fn wait(&self) -> Option<TriggerBatch<C>> {
		loop {
			let notified = self.inner.notify.notified();
			{
				let mut state = self.inner.state.lock();
				if state.closed {
					return None;
				}
				if state.armed {
					state.armed = false;
					let overflowed = std::mem::take(&mut state.overflowed);
					let causes = std::mem::take(&mut state.causes);
					return Some(TriggerBatch { causes, overflowed });
				}
			}
			notified.await;
		}
	}
}

impl<C: PartialEq> RecomputeTrigger<C> {
	/// Records `cause` and wakes the consumer.
	pub fn fire(&self, cause: C) -> FireOutcome {
		let outcome = {
			let mut state = self.inner.state.lock();
			if state.closed {
				return FireOutcome::Closed;
			}
			let was_armed = std::mem::replace(&mut state.armed, true);
			if !state.overflowed && !state.causes.contains(&cause) {
				if state.causes.len() >= MAX_CAUSES {
					state.overflowed = true;
					state.causes.clear();
				} else {
					state.causes.push(cause);
				}
			}
			if was_armed { FireOutcome::Coalesced } else { FireOutcome::Armed }
		};
		self.inner.notify.notify_one();
		outcome
	}
}
