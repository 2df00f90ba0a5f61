#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use shelf_primitives::{AppIdentity, PinSet, ProfileId, Validity};
use shelf_reconciler::{Reconciler, Snapshot, SnapshotStream, Sources, ViewConfig};
use shelf_sources::memory::{MemoryCatalog, MemoryPinStore, MemoryProfiles, MemorySuggestionFeed, ProfileRecord};
use shelf_sources::{CatalogProvider, EntryResult, PackageEvent, PinStore, Result};
use tokio::sync::{Notify, broadcast, watch};

pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Time allowed for something that must not happen.
pub const QUIET: Duration = Duration::from_millis(150);

pub const PRIMARY: u32 = 0;
pub const WORK: u32 = 10;

pub fn app(package: &str, profile: u32) -> AppIdentity {
	AppIdentity::new(package, "Main", profile)
}

/// Memory collaborators for one test device.
pub struct Device {
	pub catalog: Arc<MemoryCatalog>,
	pub profiles: Arc<MemoryProfiles>,
	pub pins: Arc<MemoryPinStore>,
	pub suggestions: Arc<MemorySuggestionFeed>,
}

impl Device {
	pub fn new(profiles: MemoryProfiles) -> Self {
		Self {
			catalog: Arc::new(MemoryCatalog::new()),
			profiles: Arc::new(profiles),
			pins: Arc::new(MemoryPinStore::default()),
			suggestions: Arc::new(MemorySuggestionFeed::new()),
		}
	}

	/// Primary profile only.
	pub fn single() -> Self {
		Self::new(MemoryProfiles::single(PRIMARY))
	}

	/// Primary profile plus a "Work" profile in its group.
	pub fn with_work_profile() -> Self {
		Self::new(MemoryProfiles::new(
			PRIMARY,
			[
				ProfileRecord::new(PRIMARY, "Owner"),
				ProfileRecord::new(WORK, "Work").in_group(PRIMARY),
			],
		))
	}

	pub fn with_pins(mut self, pins: impl IntoIterator<Item = AppIdentity>) -> Self {
		self.pins = Arc::new(MemoryPinStore::new(pins.into_iter().collect::<PinSet>()));
		self
	}

	pub fn install(&self, package: &str, profile: u32, label: &str) -> AppIdentity {
		let identity = app(package, profile);
		self.catalog.install_app(identity.clone(), label);
		identity
	}

	pub fn sources(&self) -> Sources {
		Sources::new(self.catalog.clone(), self.profiles.clone())
			.with_pins(self.pins.clone())
			.with_suggestions(self.suggestions.clone())
	}

	pub fn reconciler(&self, config: ViewConfig) -> Reconciler {
		Reconciler::new(config, self.sources()).expect("valid view config")
	}

	/// Same sources, with `catalog` in front of the memory catalog.
	pub fn reconciler_with(&self, config: ViewConfig, catalog: Arc<dyn CatalogProvider>) -> Reconciler {
		let sources = Sources::new(catalog, self.profiles.clone())
			.with_pins(self.pins.clone())
			.with_suggestions(self.suggestions.clone());
		Reconciler::new(config, sources).expect("valid view config")
	}
}

/// Holds callers at [`Gate::pass`] while closed.
#[derive(Default)]
pub struct Gate {
	closed: AtomicBool,
	entered: Notify,
	opened: Notify,
}

impl Gate {
	pub fn close(&self) {
		self.closed.store(true, Ordering::SeqCst);
	}

	pub fn open(&self) {
		self.closed.store(false, Ordering::SeqCst);
		self.opened.notify_waiters();
	}

	/// Waits until a caller is held at the closed gate.
	pub async fn entered(&self) {
		tokio::time::timeout(TIMEOUT, self.entered.notified())
			.await
			.expect("timed out waiting for the gate");
	}

	async fn pass(&self) {
		if !self.closed.load(Ordering::SeqCst) {
			return;
		}
		self.entered.notify_one();
		loop {
			let opened = self.opened.notified();
			if !self.closed.load(Ordering::SeqCst) {
				return;
			}
			opened.await;
		}
	}
}

/// Catalog whose queries answer from a [`MemoryCatalog`] but whose package
/// events are only the ones sent through [`GatedCatalog::emit`].
/// `list_eligible` waits at [`GatedCatalog::gate`].
pub struct GatedCatalog {
	pub inner: Arc<MemoryCatalog>,
	pub gate: Gate,
	events: broadcast::Sender<PackageEvent>,
}

impl GatedCatalog {
	pub fn new(inner: Arc<MemoryCatalog>) -> Self {
		Self {
			inner,
			gate: Gate::default(),
			events: broadcast::channel(64).0,
		}
	}

	pub fn emit(&self, event: PackageEvent) {
		self.events.send(event).expect("reconciler subscribed to package events");
	}
}

#[async_trait]
impl CatalogProvider for GatedCatalog {
	async fn list_eligible(&self, profile: ProfileId) -> Result<Vec<EntryResult>> {
		self.gate.pass().await;
		self.inner.list_eligible(profile).await
	}

	async fn check_eligible(&self, identity: &AppIdentity) -> Result<Validity> {
		self.inner.check_eligible(identity).await
	}

	async fn is_enabled(&self, identity: &AppIdentity) -> Result<bool> {
		self.inner.is_enabled(identity).await
	}

	async fn is_package_enabled(&self, package: &str, profile: ProfileId) -> Result<bool> {
		self.inner.is_package_enabled(package, profile).await
	}

	fn package_events(&self) -> broadcast::Receiver<PackageEvent> {
		self.events.subscribe()
	}
}

/// Pin store over a [`MemoryPinStore`] whose inserts wait at
/// [`GatedPins::gate`].
pub struct GatedPins {
	pub inner: Arc<MemoryPinStore>,
	pub gate: Gate,
}

impl GatedPins {
	pub fn new(inner: Arc<MemoryPinStore>) -> Self {
		Self {
			inner,
			gate: Gate::default(),
		}
	}
}

#[async_trait]
impl PinStore for GatedPins {
	async fn read_all(&self) -> Result<PinSet> {
		self.inner.read_all().await
	}

	fn observe(&self) -> watch::Receiver<PinSet> {
		self.inner.observe()
	}

	async fn insert(&self, identity: AppIdentity) -> Result<()> {
		self.gate.pass().await;
		self.inner.insert(identity).await
	}

	async fn delete(&self, identity: &AppIdentity) -> Result<()> {
		self.inner.delete(identity).await
	}
}

/// Waits for a snapshot satisfying `pred`, failing the test after [`TIMEOUT`].
pub async fn until(stream: &mut SnapshotStream, pred: impl FnMut(&Snapshot) -> bool) -> Snapshot {
	tokio::time::timeout(TIMEOUT, stream.wait_for(pred))
		.await
		.expect("timed out waiting for snapshot")
		.expect("publisher dropped")
}

/// Waits for the first published snapshot.
pub async fn first(stream: &mut SnapshotStream) -> Snapshot {
	until(stream, |snapshot| snapshot.version() > 0).await
}

/// Waits for any snapshot newer than `after`.
pub async fn next(stream: &mut SnapshotStream, after: &Snapshot) -> Snapshot {
	let version = after.version();
	until(stream, |snapshot| snapshot.version() > version).await
}

pub fn labels(snapshot: &Snapshot) -> Vec<&str> {
	snapshot.labels()
}

pub fn pinned_labels(snapshot: &Snapshot) -> Vec<&str> {
	snapshot
		.entries()
		.iter()
		.filter(|entry| entry.pinned)
		.map(|entry| entry.label.as_str())
		.collect()
}

/// Polls `condition` until it holds, failing the test after [`TIMEOUT`].
pub async fn eventually(what: &str, mut condition: impl FnMut() -> bool) {
	let polled = tokio::time::timeout(TIMEOUT, async {
		while !condition() {
			tokio::time::sleep(std::time::Duration::from_millis(5)).await;
		}
	})
	.await;
	assert!(polled.is_ok(), "timed out waiting for {what}");
}
