//! View configuration: which sources feed a view and how it is ordered.

use std::path::Path;

use serde::Deserialize;
use shelf_primitives::MAX_SUGGESTIONS;

use crate::{ConfigError, Result};

bitflags::bitflags! {
	/// Sources a view reads.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct SourceSet: u8 {
		const PINS = 1 << 0;
		const SUGGESTIONS = 1 << 1;
		const CATALOG = 1 << 2;
	}
}

/// Top-level ordering of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingPolicy {
	/// Stable partition: pinned entries before unpinned ones.
	PinnedFirst,
	/// One alphabetical run, pinned state ignored.
	AlphabeticalOnly,
}

/// Order inside each partition of a [`OrderingPolicy::PinnedFirst`] view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartitionOrder {
	/// Pins in persisted order, suggestions by rank, catalog as enumerated.
	Source,
	/// Alphabetical by label, then profile.
	Collated,
}

/// Named configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewPreset {
	QuickAccess,
	FullCatalog,
	PinnableCatalog,
}

/// Configuration of one reconciled view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
	/// Name used in logs.
	pub name: String,
	pub sources: SourceSet,
	pub ordering: OrderingPolicy,
	pub partition_order: PartitionOrder,
	/// Suppress suggestions whose identity is already in the pin set.
	pub dedup_against_pins: bool,
	/// Append the profile suffix to labels of secondary profiles.
	pub profile_suffix_labels: bool,
	/// Suggestions kept per rebuild, at most [`MAX_SUGGESTIONS`].
	pub max_suggestions: usize,
}

impl ViewConfig {
	/// Pinned apps followed by suggestions.
	pub fn quick_access() -> Self {
		Self {
			name: "quick-access".into(),
			sources: SourceSet::PINS | SourceSet::SUGGESTIONS,
			ordering: OrderingPolicy::PinnedFirst,
			partition_order: PartitionOrder::Source,
			dedup_against_pins: true,
			profile_suffix_labels: false,
			max_suggestions: MAX_SUGGESTIONS,
		}
	}

	/// Every eligible app of every allowed profile, alphabetically.
	pub fn full_catalog() -> Self {
		Self {
			name: "full-catalog".into(),
			sources: SourceSet::CATALOG,
			ordering: OrderingPolicy::AlphabeticalOnly,
			partition_order: PartitionOrder::Collated,
			dedup_against_pins: false,
			profile_suffix_labels: true,
			max_suggestions: MAX_SUGGESTIONS,
		}
	}

	/// The catalog with pinned apps first, for pin management screens.
	pub fn pinnable_catalog() -> Self {
		Self {
			name: "pinnable-catalog".into(),
			sources: SourceSet::CATALOG | SourceSet::PINS,
			ordering: OrderingPolicy::PinnedFirst,
			partition_order: PartitionOrder::Collated,
			dedup_against_pins: false,
			profile_suffix_labels: true,
			max_suggestions: MAX_SUGGESTIONS,
		}
	}

	/// Configuration of a named preset.
	pub fn preset(preset: ViewPreset) -> Self {
		match preset {
			ViewPreset::QuickAccess => Self::quick_access(),
			ViewPreset::FullCatalog => Self::full_catalog(),
			ViewPreset::PinnableCatalog => Self::pinnable_catalog(),
		}
	}

	/// True when pins contribute entries of their own rather than only
	/// marking catalog entries.
	pub fn pins_contribute_entries(&self) -> bool {
		self.sources.contains(SourceSet::PINS) && !self.sources.contains(SourceSet::CATALOG)
	}

	/// Checks internal consistency.
	pub fn validate(&self) -> Result<()> {
		if self.sources.is_empty() {
			return Err(ConfigError::Invalid(format!("view '{}' reads no sources", self.name)));
		}
		if self.dedup_against_pins && !self.sources.contains(SourceSet::PINS | SourceSet::SUGGESTIONS) {
			return Err(ConfigError::Invalid(format!(
				"view '{}' dedups against pins but does not read both pins and suggestions",
				self.name
			)));
		}
		if self.max_suggestions == 0 || self.max_suggestions > MAX_SUGGESTIONS {
			return Err(ConfigError::Invalid(format!(
				"max_suggestions must be within 1..={MAX_SUGGESTIONS}, got {}",
				self.max_suggestions
			)));
		}
		Ok(())
	}

	/// Parses a TOML view description.
	///
	/// ```toml
	/// preset = "quick-access"
	/// name = "sidebar"
	/// max_suggestions = 4
	/// ```
	///
	/// Keys other than `preset` override the preset's values.
	/// `max_suggestions` is clamped to `1..=K`.
	pub fn from_toml_str(input: &str) -> Result<Self> {
		let file: ViewFile = toml::from_str(input)?;
		let config = file.into_config();
		config.validate()?;
		Ok(config)
	}

	/// Reads and parses a TOML view description from `path`.
	pub fn load(path: &Path) -> Result<Self> {
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ViewFile {
	preset: ViewPreset,
	name: Option<String>,
	ordering: Option<OrderingPolicy>,
	partition_order: Option<PartitionOrder>,
	dedup_against_pins: Option<bool>,
	profile_suffix_labels: Option<bool>,
	max_suggestions: Option<usize>,
}

impl ViewFile {
	fn into_config(self) -> ViewConfig {
		let mut config = ViewConfig::preset(self.preset);
		if let Some(name) = self.name {
			config.name = name;
		}
		if let Some(ordering) = self.ordering {
			config.ordering = ordering;
		}
		if let Some(order) = self.partition_order {
			config.partition_order = order;
		}
		if let Some(dedup) = self.dedup_against_pins {
			config.dedup_against_pins = dedup;
		}
		if let Some(suffix) = self.profile_suffix_labels {
			config.profile_suffix_labels = suffix;
		}
		if let Some(max) = self.max_suggestions {
			config.max_suggestions = max.clamp(1, MAX_SUGGESTIONS);
		}
		config
	}
}
