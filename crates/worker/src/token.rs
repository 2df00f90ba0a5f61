use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Hands out attach generations. Generation 0 means "never attached".
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
	latest: Arc<AtomicU64>,
}

impl GenerationClock {
	/// Clock whose first token is generation 1.
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a new generation and returns a fresh token for it.
	pub fn begin(&self) -> GenerationToken {
		let generation = self.latest.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
		GenerationToken {
			generation,
			cancel: CancellationToken::new(),
		}
	}

	/// Most recently started generation.
	pub fn latest(&self) -> u64 {
		self.latest.load(Ordering::Acquire)
	}
}

/// Cancellation scope of one attach/detach lifecycle.
///
/// Work started under a token must not publish after [`Self::is_cancelled`]
/// turns true.
#[derive(Debug, Clone)]
pub struct GenerationToken {
	generation: u64,
	cancel: CancellationToken,
}

impl GenerationToken {
	/// Generation number this token belongs to.
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Whether this generation has been cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Cancels this generation and every child token.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Resolves once cancellation is requested.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}

	/// Child scope: cancelled with its parent, cancellable on its own.
	pub fn child(&self) -> Self {
		Self {
			generation: self.generation,
			cancel: self.cancel.child_token(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generations_are_monotonic() {
		let clock = GenerationClock::new();
		assert_eq!(clock.latest(), 0);
		let a = clock.begin();
		let b = clock.begin();
		assert_eq!(a.generation(), 1);
		assert_eq!(b.generation(), 2);
		assert_eq!(clock.latest(), 2);
	}

	#[test]
	fn cancelling_parent_cancels_children_only_downward() {
		let clock = GenerationClock::new();
		let parent = clock.begin();
		let child = parent.child();
		let other = parent.child();

		other.cancel();
		assert!(!parent.is_cancelled());
		assert!(!child.is_cancelled());

		parent.cancel();
		assert!(child.is_cancelled());
		assert_eq!(child.generation(), parent.generation());
	}
}
