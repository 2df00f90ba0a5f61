use async_trait::async_trait;
use shelf_primitives::{ProfileId, ProfileInfo};
use tokio::sync::broadcast;

use crate::Result;

/// A profile became available (unlocked, quiet mode off) or unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileEvent {
	pub profile: ProfileId,
	pub available: bool,
}

/// Source of the profiles the app list may show.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
	/// Profiles currently allowed, primary first.
	async fn list_allowed(&self) -> Result<Vec<ProfileInfo>>;

	fn availability_events(&self) -> broadcast::Receiver<ProfileEvent>;
}
