use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use shelf_primitives::{ProfileId, ProfileInfo};
use tokio::sync::broadcast;

use super::EVENT_CAPACITY;
use crate::{ProfileDirectory, ProfileEvent, Result};

/// One user known to the device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileRecord {
	pub id: ProfileId,
	pub name: String,
	/// Parent user for managed profiles.
	#[serde(default)]
	pub profile_group: Option<ProfileId>,
	/// Locked / paused profile.
	#[serde(default)]
	pub quiet_mode: bool,
}

impl ProfileRecord {
	/// Unlocked profile outside any group.
	pub fn new(id: impl Into<ProfileId>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			profile_group: None,
			quiet_mode: false,
		}
	}

	/// Places the profile in the group of `parent`.
	#[must_use]
	pub fn in_group(mut self, parent: impl Into<ProfileId>) -> Self {
		self.profile_group = Some(parent.into());
		self
	}
}

/// In-memory user directory.
///
/// A profile is allowed if it is the current user, or a profile of the
/// current user's group that is not in quiet mode.
pub struct MemoryProfiles {
	current: ProfileId,
	records: RwLock<Vec<ProfileRecord>>,
	events: broadcast::Sender<ProfileEvent>,
}

impl MemoryProfiles {
	/// Directory of `records` as seen from `current`.
	pub fn new(current: impl Into<ProfileId>, records: impl IntoIterator<Item = ProfileRecord>) -> Self {
		let (events, _) = broadcast::channel(EVENT_CAPACITY);
		Self {
			current: current.into(),
			records: RwLock::new(records.into_iter().collect()),
			events,
		}
	}

	/// Single-user directory containing only `current`.
	pub fn single(current: impl Into<ProfileId>) -> Self {
		let current = current.into();
		Self::new(current, [ProfileRecord::new(current, "Owner")])
	}

	/// Profile the process runs as.
	pub fn current(&self) -> ProfileId {
		self.current
	}

	/// Toggles quiet mode and emits the resulting availability change.
	pub fn set_quiet_mode(&self, profile: ProfileId, quiet: bool) {
		let changed = {
			let mut records = self.records.write();
			match records.iter_mut().find(|r| r.id == profile) {
				Some(record) if record.quiet_mode != quiet => {
					record.quiet_mode = quiet;
					true
				}
				_ => false,
			}
		};
		if changed {
			tracing::debug!(profile = profile.get(), quiet, "profiles.quiet_mode");
			let _ = self.events.send(ProfileEvent { profile, available: !quiet });
		}
	}

	/// Number of live availability subscriptions.
	pub fn subscriber_count(&self) -> usize {
		self.events.receiver_count()
	}

	fn is_allowed(&self, record: &ProfileRecord) -> bool {
		record.id == self.current || (record.profile_group == Some(self.current) && !record.quiet_mode)
	}
}

#[async_trait]
impl ProfileDirectory for MemoryProfiles {
	async fn list_allowed(&self) -> Result<Vec<ProfileInfo>> {
		let records = self.records.read();
		let mut allowed: Vec<ProfileInfo> = records
			.iter()
			.filter(|record| self.is_allowed(record))
			.map(|record| {
				if record.id == self.current {
					ProfileInfo::primary(record.id)
				} else {
					ProfileInfo::secondary(record.id, &record.name, true)
				}
			})
			.collect();
		allowed.sort_by_key(|info| (!info.is_primary(), info.id));
		Ok(allowed)
	}

	fn availability_events(&self) -> broadcast::Receiver<ProfileEvent> {
		self.events.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn directory() -> MemoryProfiles {
		MemoryProfiles::new(
			0,
			[
				ProfileRecord::new(10, "Work").in_group(0),
				ProfileRecord::new(0, "Owner"),
				ProfileRecord::new(11, "Guest"),
			],
		)
	}

	#[tokio::test]
	async fn only_current_user_and_its_unlocked_profiles_are_allowed() {
		let profiles = directory();
		let allowed = profiles.list_allowed().await.unwrap();
		assert_eq!(allowed, vec![ProfileInfo::primary(0), ProfileInfo::secondary(10, "Work", true)]);
	}

	#[tokio::test]
	async fn quiet_mode_hides_profile_and_notifies() {
		let profiles = directory();
		let mut events = profiles.availability_events();

		profiles.set_quiet_mode(ProfileId(10), true);
		profiles.set_quiet_mode(ProfileId(10), true);
		assert_eq!(
			events.recv().await.unwrap(),
			ProfileEvent {
				profile: ProfileId(10),
				available: false
			}
		);
		assert!(events.try_recv().is_err());
		assert_eq!(profiles.list_allowed().await.unwrap(), vec![ProfileInfo::primary(0)]);
	}
}
