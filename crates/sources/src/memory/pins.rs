use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use shelf_primitives::{AppIdentity, PinSet};
use tokio::sync::watch;

use crate::{PinStore, Result, SourceError};

/// In-memory pin store.
///
/// Writes are serialized through one async lock so concurrent reconcilers
/// never interleave read-modify-write cycles.
pub struct MemoryPinStore {
	tx: watch::Sender<PinSet>,
	write: tokio::sync::Mutex<()>,
	deleted: Mutex<Vec<AppIdentity>>,
	unavailable: AtomicBool,
}

impl Default for MemoryPinStore {
	fn default() -> Self {
		Self::new(PinSet::new())
	}
}

impl MemoryPinStore {
	/// Store seeded with `initial`.
	pub fn new(initial: PinSet) -> Self {
		let (tx, _) = watch::channel(initial);
		Self {
			tx,
			write: tokio::sync::Mutex::new(()),
			deleted: Mutex::new(Vec::new()),
			unavailable: AtomicBool::new(false),
		}
	}

	/// Current persisted contents.
	pub fn snapshot(&self) -> PinSet {
		self.tx.borrow().clone()
	}

	/// Every identity removed through [`PinStore::delete`], in order.
	pub fn deleted(&self) -> Vec<AppIdentity> {
		self.deleted.lock().clone()
	}

	/// Makes reads and writes fail with [`SourceError::Unavailable`].
	pub fn set_unavailable(&self, unavailable: bool) {
		self.unavailable.store(unavailable, Ordering::Release);
	}

	/// Number of live observers.
	pub fn observer_count(&self) -> usize {
		self.tx.receiver_count()
	}

	fn ensure_available(&self) -> Result<()> {
		if self.unavailable.load(Ordering::Acquire) {
			return Err(SourceError::Unavailable("pin store".into()));
		}
		Ok(())
	}
}

#[async_trait]
impl PinStore for MemoryPinStore {
	async fn read_all(&self) -> Result<PinSet> {
		self.ensure_available()?;
		Ok(self.snapshot())
	}

	fn observe(&self) -> watch::Receiver<PinSet> {
		self.tx.subscribe()
	}

	async fn insert(&self, identity: AppIdentity) -> Result<()> {
		let _write = self.write.lock().await;
		self.ensure_available()?;
		self.tx.send_if_modified(|pins| pins.insert(identity));
		Ok(())
	}

	async fn delete(&self, identity: &AppIdentity) -> Result<()> {
		let _write = self.write.lock().await;
		self.ensure_available()?;
		if self.tx.send_if_modified(|pins| pins.remove(identity)) {
			self.deleted.lock().push(identity.clone());
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn writes_notify_observers_only_on_change() {
		let store = MemoryPinStore::default();
		let mut rx = store.observe();
		let a = AppIdentity::new("a", "Main", 0);

		store.insert(a.clone()).await.unwrap();
		assert!(rx.has_changed().unwrap());
		rx.borrow_and_update();

		store.insert(a.clone()).await.unwrap();
		assert!(!rx.has_changed().unwrap());

		store.delete(&a).await.unwrap();
		store.delete(&a).await.unwrap();
		assert!(rx.has_changed().unwrap());
		assert!(store.snapshot().is_empty());
		assert_eq!(store.deleted(), vec![a]);
	}
}
