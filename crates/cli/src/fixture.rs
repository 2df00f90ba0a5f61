//! Device fixtures: a TOML description of one device, loaded into memory
//! collaborators.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;
use shelf_primitives::{AppIdentity, PinSet, ProfileId};
use shelf_reconciler::Sources;
use shelf_sources::PinStore;
use shelf_sources::memory::{AppRecord, MemoryCatalog, MemoryPinStore, MemoryProfiles, MemorySuggestionFeed, ProfileRecord};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
	#[serde(default)]
	pub current_profile: ProfileId,
	#[serde(default)]
	pub profiles: Vec<ProfileRecord>,
	#[serde(default)]
	pub apps: Vec<AppFixture>,
	#[serde(default)]
	pub pins: Vec<AppIdentity>,
	#[serde(default)]
	pub suggestions: Vec<SuggestionFixture>,
	/// Makes the suggestion feed refuse update requests.
	#[serde(default)]
	pub suggestions_unavailable: bool,
}

#[derive(Debug, Deserialize)]
pub struct AppFixture {
	#[serde(flatten)]
	pub identity: AppIdentity,
	#[serde(flatten)]
	pub record: AppRecord,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionFixture {
	#[serde(flatten)]
	pub identity: AppIdentity,
	pub rank: u32,
}

impl Fixture {
	/// Parses a fixture from TOML text.
	pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
		toml::from_str(input).context("failed to parse device fixture")
	}

	/// Reads and parses the fixture at `path`.
	pub fn load(path: &Path) -> anyhow::Result<Self> {
		let input = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
		Self::from_toml_str(&input).with_context(|| format!("in {}", path.display()))
	}

	/// Builds memory collaborators holding this fixture's state.
	pub fn into_device(self) -> Device {
		let current = self.current_profile;
		let mut records = self.profiles;
		if !records.iter().any(|record| record.id == current) {
			records.push(ProfileRecord::new(current, "Owner"));
		}

		let catalog = MemoryCatalog::new();
		for app in self.apps {
			catalog.install(app.identity, app.record);
		}

		let suggestions = MemorySuggestionFeed::new();
		suggestions.push(self.suggestions.into_iter().map(|s| (s.identity, s.rank)));
		suggestions.set_unavailable(self.suggestions_unavailable);

		tracing::debug!(profiles = records.len(), pins = self.pins.len(), "fixture.loaded");
		Device {
			catalog: Arc::new(catalog),
			profiles: Arc::new(MemoryProfiles::new(current, records)),
			pins: Arc::new(MemoryPinStore::new(self.pins.into_iter().collect())),
			suggestions: Arc::new(suggestions),
		}
	}
}

/// Memory collaborators for one fixture.
pub struct Device {
	catalog: Arc<MemoryCatalog>,
	profiles: Arc<MemoryProfiles>,
	pins: Arc<MemoryPinStore>,
	suggestions: Arc<MemorySuggestionFeed>,
}

impl Device {
	/// Memory collaborators seeded from this fixture.
	pub fn sources(&self) -> Sources {
		Sources::new(self.catalog.clone(), self.profiles.clone())
			.with_pins(self.pins.clone())
			.with_suggestions(self.suggestions.clone())
	}

	/// Persisted pins as the pin store reports them.
	pub async fn pins(&self) -> anyhow::Result<PinSet> {
		Ok(self.pins.read_all().await?)
	}
}
