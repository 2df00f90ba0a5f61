use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use shelf_primitives::{AppIdentity, SuggestionList};
use tokio::sync::watch;

use crate::{Result, SourceError, SuggestionFeed};

/// Suggestion feed driven by explicit pushes.
pub struct MemorySuggestionFeed {
	tx: watch::Sender<SuggestionList>,
	unavailable: AtomicBool,
	requests: AtomicUsize,
}

impl Default for MemorySuggestionFeed {
	fn default() -> Self {
		Self::new()
	}
}

impl MemorySuggestionFeed {
	/// Feed with no suggestions published yet.
	pub fn new() -> Self {
		let (tx, _) = watch::channel(SuggestionList::empty());
		Self {
			tx,
			unavailable: AtomicBool::new(false),
			requests: AtomicUsize::new(0),
		}
	}

	/// Replaces the current suggestions with `candidates`.
	pub fn push(&self, candidates: impl IntoIterator<Item = (AppIdentity, u32)>) {
		let list = SuggestionList::from_ranked(candidates);
		tracing::debug!(count = list.len(), "suggestions.push");
		self.tx.send_replace(list);
	}

	/// Makes `request_update` fail.
	pub fn set_unavailable(&self, unavailable: bool) {
		self.unavailable.store(unavailable, Ordering::Release);
	}

	/// Number of refresh requests received.
	pub fn request_count(&self) -> usize {
		self.requests.load(Ordering::Acquire)
	}

	/// Number of live update subscriptions.
	pub fn subscriber_count(&self) -> usize {
		self.tx.receiver_count()
	}
}

#[async_trait]
impl SuggestionFeed for MemorySuggestionFeed {
	async fn request_update(&self) -> Result<()> {
		self.requests.fetch_add(1, Ordering::AcqRel);
		if self.unavailable.load(Ordering::Acquire) {
			return Err(SourceError::Unavailable("suggestion feed".into()));
		}
		Ok(())
	}

	fn subscribe(&self) -> watch::Receiver<SuggestionList> {
		self.tx.subscribe()
	}
}
