use serde::{Deserialize, Serialize};

use crate::AppIdentity;

/// Opaque icon handle owned by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconRef(pub u64);

/// One launchable, eligible entry point as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
	pub identity: AppIdentity,
	pub label: String,
	#[serde(default)]
	pub icon: IconRef,
}

impl CatalogEntry {
	/// Catalog entry for `identity` with its display label and icon.
	pub fn new(identity: AppIdentity, label: impl Into<String>, icon: IconRef) -> Self {
		Self {
			identity,
			label: label.into(),
			icon,
		}
	}
}

/// One row of a published app list.
///
/// `pinned` is view-dependent: it reflects membership in the pin set at the
/// time the snapshot was computed. `suggestion_rank` is only present on
/// entries contributed by the suggestion feed (lower is more relevant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppEntry {
	pub identity: AppIdentity,
	pub label: String,
	pub icon: IconRef,
	pub pinned: bool,
	pub suggestion_rank: Option<u32>,
}

impl AppEntry {
	/// Creates an unpinned, unranked entry.
	pub fn new(identity: AppIdentity, label: impl Into<String>, icon: IconRef) -> Self {
		Self {
			identity,
			label: label.into(),
			icon,
			pinned: false,
			suggestion_rank: None,
		}
	}

	/// Marks the entry as pinned.
	#[must_use]
	pub fn pinned(mut self) -> Self {
		self.pinned = true;
		self
	}

	/// Attaches a suggestion rank.
	#[must_use]
	pub fn ranked(mut self, rank: u32) -> Self {
		self.suggestion_rank = Some(rank);
		self
	}
}

impl From<CatalogEntry> for AppEntry {
	fn from(entry: CatalogEntry) -> Self {
		Self::new(entry.identity, entry.label, entry.icon)
	}
}
