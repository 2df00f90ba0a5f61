use shelf_primitives::{AppIdentity, ProfileId};
use shelf_sources::{PackageEvent, ProfileEvent};
use shelf_worker::TriggerBatch;

use super::Shared;

/// Why a rebuild was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Cause {
	Attach,
	Command,
	PinsChanged,
	SuggestionsChanged,
	PackageAdded { package: String, profile: ProfileId },
	PackageRemoved { package: String, profile: ProfileId },
	PackageChanged { package: String, profile: ProfileId },
	ProfileAvailable(ProfileId),
	ProfileUnavailable(ProfileId),
	/// Events were lost; only a full rebuild is safe.
	Resync,
}

impl From<PackageEvent> for Cause {
	fn from(event: PackageEvent) -> Self {
		match event {
			PackageEvent::Added { package, profile } => Self::PackageAdded { package, profile },
			PackageEvent::Removed { package, profile } => Self::PackageRemoved { package, profile },
			PackageEvent::Changed { package, profile } => Self::PackageChanged { package, profile },
		}
	}
}

impl From<ProfileEvent> for Cause {
	fn from(event: ProfileEvent) -> Self {
		if event.available {
			Self::ProfileAvailable(event.profile)
		} else {
			Self::ProfileUnavailable(event.profile)
		}
	}
}

/// Something that disappeared since the last rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Removal {
	Package { package: String, profile: ProfileId },
	Profile(ProfileId),
}

impl Removal {
	pub(super) fn drops(&self, identity: &AppIdentity) -> bool {
		match self {
			Self::Package { package, profile } => identity.is_package_in(package, *profile),
			Self::Profile(profile) => identity.profile == *profile,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Plan {
	Full,
	/// Every cause only removes entries, confirmed against the catalog; the
	/// previous build can be filtered instead of regathered.
	Incremental(Vec<Removal>),
}

/// Picks the cheapest rebuild that yields the same result as a full one.
pub(super) async fn plan(shared: &Shared, batch: &TriggerBatch<Cause>, has_baseline: bool) -> Plan {
	if !has_baseline || batch.overflowed || batch.causes.is_empty() {
		return Plan::Full;
	}

	let mut removals = Vec::with_capacity(batch.causes.len());
	for cause in &batch.causes {
		match cause {
			Cause::ProfileUnavailable(profile) => removals.push(Removal::Profile(*profile)),
			// Notifications can arrive late; only trust them if the catalog agrees.
			Cause::PackageRemoved { package, profile } | Cause::PackageChanged { package, profile } => {
				match shared.sources.catalog.is_package_enabled(package, *profile).await {
					Ok(false) => removals.push(Removal::Package {
						package: package.clone(),
						profile: *profile,
					}),
					Ok(true) => return Plan::Full,
					Err(err) => {
						tracing::debug!(%package, %profile, error = %err, "reconciler.plan.package_state_unknown");
						return Plan::Full;
					}
				}
			}
			_ => return Plan::Full,
		}
	}
	Plan::Incremental(removals)
}
