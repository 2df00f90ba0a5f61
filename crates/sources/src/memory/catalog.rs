use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use shelf_primitives::{AppIdentity, CatalogEntry, IconRef, InvalidReason, ProfileId, Validity};
use tokio::sync::broadcast;

use super::EVENT_CAPACITY;
use crate::{CatalogProvider, EntryResult, PackageEvent, Result, SourceError};

/// State of one installed entry point.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppRecord {
	pub label: String,
	#[serde(default)]
	pub icon: IconRef,
	#[serde(default = "default_true")]
	pub enabled: bool,
	/// Can run in the windowing mode the launcher targets.
	#[serde(default = "default_true")]
	pub eligible: bool,
	/// Reading this entry fails (simulates a corrupt package record).
	#[serde(default)]
	pub broken: bool,
}

fn default_true() -> bool {
	true
}

impl AppRecord {
	/// Enabled, eligible and readable record labelled `label`.
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			icon: IconRef::default(),
			enabled: true,
			eligible: true,
			broken: false,
		}
	}
}

/// In-memory package catalog.
pub struct MemoryCatalog {
	apps: RwLock<BTreeMap<AppIdentity, AppRecord>>,
	events: broadcast::Sender<PackageEvent>,
	unavailable: AtomicBool,
	list_calls: AtomicUsize,
}

impl Default for MemoryCatalog {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryCatalog {
	/// Empty catalog.
	pub fn new() -> Self {
		let (events, _) = broadcast::channel(EVENT_CAPACITY);
		Self {
			apps: RwLock::new(BTreeMap::new()),
			events,
			unavailable: AtomicBool::new(false),
			list_calls: AtomicUsize::new(0),
		}
	}

	/// Installs (or replaces) one entry point and emits `Added`.
	pub fn install(&self, identity: AppIdentity, record: AppRecord) {
		let event = PackageEvent::Added {
			package: identity.package.clone(),
			profile: identity.profile,
		};
		self.apps.write().insert(identity, record);
		self.emit(event);
	}

	/// Installs an entry point labelled `label` with default flags.
	pub fn install_app(&self, identity: AppIdentity, label: &str) {
		self.install(identity, AppRecord::new(label));
	}

	/// Removes every entry point of `package` in `profile` and emits `Removed`.
	pub fn uninstall(&self, package: &str, profile: ProfileId) {
		self.apps.write().retain(|id, _| !id.is_package_in(package, profile));
		self.emit(PackageEvent::Removed {
			package: package.to_string(),
			profile,
		});
	}

	/// Enables or disables every entry point of `package` and emits `Changed`.
	pub fn set_package_enabled(&self, package: &str, profile: ProfileId, enabled: bool) {
		self.update_package(package, profile, |record| record.enabled = enabled);
	}

	/// Flips eligibility of one entry point and emits `Changed`.
	pub fn set_eligible(&self, identity: &AppIdentity, eligible: bool) {
		if let Some(record) = self.apps.write().get_mut(identity) {
			record.eligible = eligible;
		}
		self.emit(PackageEvent::Changed {
			package: identity.package.clone(),
			profile: identity.profile,
		});
	}

	/// Marks one entry as unreadable without emitting an event.
	pub fn set_broken(&self, identity: &AppIdentity, broken: bool) {
		if let Some(record) = self.apps.write().get_mut(identity) {
			record.broken = broken;
		}
	}

	/// Makes every query fail with [`SourceError::Unavailable`].
	pub fn set_unavailable(&self, unavailable: bool) {
		self.unavailable.store(unavailable, Ordering::Release);
	}

	/// Number of live package event subscriptions.
	pub fn subscriber_count(&self) -> usize {
		self.events.receiver_count()
	}

	/// Number of `list_eligible` calls served so far.
	pub fn list_calls(&self) -> usize {
		self.list_calls.load(Ordering::Acquire)
	}

	fn update_package(&self, package: &str, profile: ProfileId, f: impl Fn(&mut AppRecord)) {
		{
			let mut apps = self.apps.write();
			for (_, record) in apps.iter_mut().filter(|(id, _)| id.is_package_in(package, profile)) {
				f(record);
			}
		}
		self.emit(PackageEvent::Changed {
			package: package.to_string(),
			profile,
		});
	}

	fn emit(&self, event: PackageEvent) {
		// No receivers just means nobody is attached.
		let _ = self.events.send(event);
	}

	fn ensure_available(&self) -> Result<()> {
		if self.unavailable.load(Ordering::Acquire) {
			return Err(SourceError::Unavailable("catalog".into()));
		}
		Ok(())
	}
}

#[async_trait]
impl CatalogProvider for MemoryCatalog {
	async fn list_eligible(&self, profile: ProfileId) -> Result<Vec<EntryResult>> {
		self.list_calls.fetch_add(1, Ordering::AcqRel);
		self.ensure_available()?;
		let apps = self.apps.read();
		let entries = apps
			.iter()
			.filter(|(id, record)| id.profile == profile && record.enabled && (record.eligible || record.broken))
			.map(|(id, record)| {
				if record.broken {
					Err(SourceError::Entry {
						identity: id.clone(),
						message: "unreadable package record".into(),
					})
				} else {
					Ok(CatalogEntry::new(id.clone(), record.label.clone(), record.icon))
				}
			})
			.collect();
		Ok(entries)
	}

	async fn check_eligible(&self, identity: &AppIdentity) -> Result<Validity> {
		self.ensure_available()?;
		let apps = self.apps.read();
		let Some(record) = apps.get(identity) else {
			return Ok(Validity::Invalid(InvalidReason::NotInstalled));
		};
		if record.broken {
			return Err(SourceError::Entry {
				identity: identity.clone(),
				message: "unreadable package record".into(),
			});
		}
		if !record.eligible {
			return Ok(Validity::Invalid(InvalidReason::NotEligible));
		}
		Ok(Validity::Valid {
			label: record.label.clone(),
			icon: record.icon,
		})
	}

	async fn is_enabled(&self, identity: &AppIdentity) -> Result<bool> {
		self.ensure_available()?;
		Ok(self.apps.read().get(identity).is_some_and(|record| record.enabled))
	}

	async fn is_package_enabled(&self, package: &str, profile: ProfileId) -> Result<bool> {
		self.ensure_available()?;
		Ok(self
			.apps
			.read()
			.iter()
			.any(|(id, record)| id.is_package_in(package, profile) && record.enabled))
	}

	fn package_events(&self) -> broadcast::Receiver<PackageEvent> {
		self.events.subscribe()
	}
}
