use async_trait::async_trait;
use shelf_primitives::{AppIdentity, CatalogEntry, ProfileId, Validity};
use tokio::sync::broadcast;

use crate::{Result, SourceError};

/// Outcome for one entry of an enumeration.
pub type EntryResult = std::result::Result<CatalogEntry, SourceError>;

/// Package lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageEvent {
	Added { package: String, profile: ProfileId },
	Removed { package: String, profile: ProfileId },
	/// Enabled state or entry points changed.
	Changed { package: String, profile: ProfileId },
}

impl PackageEvent {
	/// Package the event is about.
	pub fn package(&self) -> &str {
		match self {
			Self::Added { package, .. } | Self::Removed { package, .. } | Self::Changed { package, .. } => package,
		}
	}

	/// Profile the package lives in.
	pub fn profile(&self) -> ProfileId {
		match self {
			Self::Added { profile, .. } | Self::Removed { profile, .. } | Self::Changed { profile, .. } => *profile,
		}
	}
}

/// OS launchable-activity catalog.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
	/// Enumerates launchable, eligible entry points of `profile`.
	///
	/// The outer error means the whole enumeration failed. Inner errors are
	/// per entry; the remaining entries stay usable.
	async fn list_eligible(&self, profile: ProfileId) -> Result<Vec<EntryResult>>;

	/// Re-checks one identity.
	async fn check_eligible(&self, identity: &AppIdentity) -> Result<Validity>;

	async fn is_enabled(&self, identity: &AppIdentity) -> Result<bool>;

	/// Whether `package` is currently enabled for `profile`. Uninstalled
	/// packages report false.
	async fn is_package_enabled(&self, package: &str, profile: ProfileId) -> Result<bool>;

	/// Subscribes to package lifecycle events.
	fn package_events(&self) -> broadcast::Receiver<PackageEvent>;
}
