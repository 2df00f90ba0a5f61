use serde::{Deserialize, Serialize};

use crate::ProfileId;

/// A user profile as seen by the app list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInfo {
	pub id: ProfileId,
	/// Label disambiguation suffix. Empty for the primary profile.
	pub suffix: String,
	pub allowed: bool,
}

impl ProfileInfo {
	/// The primary (current) profile: no suffix, always allowed.
	pub fn primary(id: impl Into<ProfileId>) -> Self {
		Self {
			id: id.into(),
			suffix: String::new(),
			allowed: true,
		}
	}

	/// A secondary profile, suffixed with ` (<name>)`.
	pub fn secondary(id: impl Into<ProfileId>, name: &str, allowed: bool) -> Self {
		Self {
			id: id.into(),
			suffix: format!(" ({name})"),
			allowed,
		}
	}

	/// Whether this is the profile the process runs as.
	pub fn is_primary(&self) -> bool {
		self.suffix.is_empty()
	}

	/// Appends this profile's suffix to `label`.
	pub fn decorate(&self, label: &str) -> String {
		format!("{label}{}", self.suffix)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn secondary_profile_decorates_labels() {
		let work = ProfileInfo::secondary(10, "Work", true);
		assert_eq!(work.decorate("Mail"), "Mail (Work)");
		assert!(!work.is_primary());

		let me = ProfileInfo::primary(0);
		assert_eq!(me.decorate("Mail"), "Mail");
		assert!(me.is_primary());
	}
}
