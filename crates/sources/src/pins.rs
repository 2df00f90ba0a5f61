use async_trait::async_trait;
use shelf_primitives::{AppIdentity, PinSet};
use tokio::sync::watch;

use crate::Result;

/// Persisted, observable, ordered pin set shared by every reconciler of a
/// process. All mutation goes through [`Self::insert`] and [`Self::delete`].
///
/// A write is visible on every [`Self::observe`] receiver by the time the
/// write returns.
#[async_trait]
pub trait PinStore: Send + Sync {
	async fn read_all(&self) -> Result<PinSet>;

	/// Latest-value stream; the receiver starts at the current contents.
	fn observe(&self) -> watch::Receiver<PinSet>;

	/// Appends `identity` at the end of the persisted order if absent.
	async fn insert(&self, identity: AppIdentity) -> Result<()>;

	/// Removes `identity` if present.
	async fn delete(&self, identity: &AppIdentity) -> Result<()>;
}
