use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OS-level user/profile identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub u32);

impl ProfileId {
	/// Returns the raw numeric id.
	pub const fn get(self) -> u32 {
		self.0
	}
}

impl fmt::Display for ProfileId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<u32> for ProfileId {
	fn from(value: u32) -> Self {
		Self(value)
	}
}

/// Identity of one launchable entry point within one profile.
///
/// Equality, hashing and ordering use exactly these three fields in declaration
/// order. Nothing else about an app participates in identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AppIdentity {
	/// Package the entry point ships in.
	pub package: String,
	/// Entry point (activity) name inside the package.
	pub entry_point: String,
	/// Profile the package is installed for.
	pub profile: ProfileId,
}

impl AppIdentity {
	/// Creates a new identity.
	pub fn new(package: impl Into<String>, entry_point: impl Into<String>, profile: impl Into<ProfileId>) -> Self {
		Self {
			package: package.into(),
			entry_point: entry_point.into(),
			profile: profile.into(),
		}
	}

	/// Returns true if this identity belongs to `package` in `profile`.
	pub fn is_package_in(&self, package: &str, profile: ProfileId) -> bool {
		self.profile == profile && self.package == package
	}
}

impl fmt::Display for AppIdentity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}@{}", self.package, self.entry_point, self.profile)
	}
}

/// Error parsing an identity from its `package/entry@profile` form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid app identity '{input}': expected package/entry@profile")]
pub struct ParseIdentityError {
	input: String,
}

impl FromStr for AppIdentity {
	type Err = ParseIdentityError;

	fn from_str(input: &str) -> Result<Self, Self::Err> {
		let invalid = || ParseIdentityError { input: input.to_string() };
		let (rest, profile) = input.rsplit_once('@').ok_or_else(invalid)?;
		let (package, entry_point) = rest.split_once('/').ok_or_else(invalid)?;
		let profile: u32 = profile.parse().map_err(|_| invalid())?;
		if package.is_empty() || entry_point.is_empty() {
			return Err(invalid());
		}
		Ok(Self::new(package, entry_point, profile))
	}
}
