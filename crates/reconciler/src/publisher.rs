//! Latest-wins snapshot publication.
//!
//! One writer replaces the current [`Snapshot`]; observers hold a
//! [`SnapshotStream`] and only ever see the newest value. Intermediate
//! snapshots overwritten before an observer looked are skipped, which is
//! safe because every snapshot is a complete recomputation.

use std::sync::Arc;

use shelf_primitives::AppEntry;
use tokio::sync::watch;

/// One immutable published app list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
	version: u64,
	generation: u64,
	commands_applied: u64,
	entries: Arc<[AppEntry]>,
}

impl Snapshot {
	/// Publish counter; 0 is the empty snapshot that precedes the first rebuild.
	pub fn version(&self) -> u64 {
		self.version
	}

	/// Attach generation that produced this snapshot.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Sequence number of the last pin/unpin command reflected here.
	pub fn commands_applied(&self) -> u64 {
		self.commands_applied
	}

	/// Entries in display order.
	pub fn entries(&self) -> &[AppEntry] {
		&self.entries
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the list is empty.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Labels in published order.
	pub fn labels(&self) -> Vec<&str> {
		self.entries.iter().map(|entry| entry.label.as_str()).collect()
	}

	/// Entry for `identity`, if listed.
	pub fn find(&self, identity: &shelf_primitives::AppIdentity) -> Option<&AppEntry> {
		self.entries.iter().find(|entry| &entry.identity == identity)
	}
}

/// Single-writer side of a snapshot channel.
#[derive(Debug)]
pub struct SnapshotPublisher {
	tx: watch::Sender<Snapshot>,
}

impl Default for SnapshotPublisher {
	fn default() -> Self {
		Self::new()
	}
}

impl SnapshotPublisher {
	/// Publisher holding the empty version 0 snapshot.
	pub fn new() -> Self {
		let (tx, _) = watch::channel(Snapshot::default());
		Self { tx }
	}

	/// Replaces the current snapshot and returns its version.
	pub fn publish(&self, generation: u64, commands_applied: u64, entries: Vec<AppEntry>) -> u64 {
		let version = self.tx.borrow().version.wrapping_add(1);
		self.tx.send_replace(Snapshot {
			version,
			generation,
			commands_applied,
			entries: entries.into(),
		});
		version
	}

	/// Latest published snapshot.
	pub fn current(&self) -> Snapshot {
		self.tx.borrow().clone()
	}

	/// New observer, starting at the current snapshot.
	pub fn subscribe(&self) -> SnapshotStream {
		SnapshotStream { rx: self.tx.subscribe() }
	}

	/// Number of live observers.
	pub fn observer_count(&self) -> usize {
		self.tx.receiver_count()
	}
}

/// Observer side of a snapshot channel.
#[derive(Debug, Clone)]
pub struct SnapshotStream {
	rx: watch::Receiver<Snapshot>,
}

impl SnapshotStream {
	/// Current snapshot; marks it as seen.
	pub fn current(&mut self) -> Snapshot {
		self.rx.borrow_and_update().clone()
	}

	/// Waits for a snapshot newer than the last one seen. Returns `None` once
	/// the publisher is gone.
	pub async fn changed(&mut self) -> Option<Snapshot> {
		self.rx.changed().await.ok()?;
		Some(self.current())
	}

	/// Waits until the current or a later snapshot satisfies `pred`.
	pub async fn wait_for(&mut self, mut pred: impl FnMut(&Snapshot) -> bool) -> Option<Snapshot> {
		self.rx.wait_for(|snapshot| pred(snapshot)).await.ok().map(|snapshot| snapshot.clone())
	}

	/// Waits for the first snapshot reflecting the command behind `ticket`.
	pub async fn wait_for_command(&mut self, ticket: crate::CommandTicket) -> Option<Snapshot> {
		self.wait_for(|snapshot| snapshot.commands_applied() >= ticket.seq()).await
	}
}
