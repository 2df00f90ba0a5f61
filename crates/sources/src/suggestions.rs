use async_trait::async_trait;
use shelf_primitives::SuggestionList;
use tokio::sync::watch;

use crate::Result;

/// Push-based ranked suggestion feed.
#[async_trait]
pub trait SuggestionFeed: Send + Sync {
	/// Asks the feed to recompute; results arrive on [`Self::subscribe`].
	async fn request_update(&self) -> Result<()>;

	/// Latest pushed list. Each push replaces the previous list wholesale.
	fn subscribe(&self) -> watch::Receiver<SuggestionList>;
}
