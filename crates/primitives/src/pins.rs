use serde::{Deserialize, Serialize};

use crate::{AppIdentity, ProfileId};

/// Ordered set of pinned identities in persisted (insertion) order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinSet {
	items: Vec<AppIdentity>,
}

impl PinSet {
	/// Empty pin set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of pins.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Whether nothing is pinned.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Whether `identity` is pinned.
	pub fn contains(&self, identity: &AppIdentity) -> bool {
		self.items.contains(identity)
	}

	/// Appends `identity` if absent. Returns false when it was already pinned.
	pub fn insert(&mut self, identity: AppIdentity) -> bool {
		if self.contains(&identity) {
			return false;
		}
		self.items.push(identity);
		true
	}

	/// Removes `identity` if present, preserving the order of the rest.
	pub fn remove(&mut self, identity: &AppIdentity) -> bool {
		let before = self.items.len();
		self.items.retain(|it| it != identity);
		self.items.len() != before
	}

	/// Pinned identities of `package` in `profile`.
	pub fn of_package<'a>(&'a self, package: &'a str, profile: ProfileId) -> impl Iterator<Item = &'a AppIdentity> + 'a {
		self.items.iter().filter(move |it| it.is_package_in(package, profile))
	}

	/// Pins in persisted order.
	pub fn iter(&self) -> std::slice::Iter<'_, AppIdentity> {
		self.items.iter()
	}
}

impl FromIterator<AppIdentity> for PinSet {
	fn from_iter<I: IntoIterator<Item = AppIdentity>>(iter: I) -> Self {
		let mut set = Self::new();
		for identity in iter {
			set.insert(identity);
		}
		set
	}
}

impl<'a> IntoIterator for &'a PinSet {
	type Item = &'a AppIdentity;
	type IntoIter = std::slice::Iter<'a, AppIdentity>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn id(pkg: &str) -> AppIdentity {
		AppIdentity::new(pkg, "Main", 0)
	}

	#[test]
	fn insert_appends_once() {
		let mut pins = PinSet::new();
		assert!(pins.insert(id("a")));
		assert!(pins.insert(id("b")));
		assert!(!pins.insert(id("a")));
		let order: Vec<_> = pins.iter().map(|it| it.package.as_str()).collect();
		assert_eq!(order, ["a", "b"]);
	}

	#[test]
	fn remove_keeps_remaining_order() {
		let mut pins: PinSet = [id("a"), id("b"), id("c")].into_iter().collect();
		assert!(pins.remove(&id("b")));
		assert!(!pins.remove(&id("b")));
		let order: Vec<_> = pins.iter().map(|it| it.package.as_str()).collect();
		assert_eq!(order, ["a", "c"]);
	}

	#[test]
	fn collecting_drops_duplicates() {
		let pins: PinSet = [id("a"), id("a"), id("b")].into_iter().collect();
		assert_eq!(pins.len(), 2);
	}
}
