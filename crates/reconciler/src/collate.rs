//! Label collation for alphabetical views.
//!
//! Labels compare case-insensitively with surrounding whitespace ignored.
//! Labels equal under that folding fall back to their raw form so the order
//! stays total.

use std::cmp::Ordering;

use shelf_primitives::AppEntry;

/// Folded sort key of `label`.
pub fn collation_key(label: &str) -> String {
	label.trim().chars().flat_map(char::to_lowercase).collect()
}

/// Compares two labels by collation.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
	collation_key(a).cmp(&collation_key(b)).then_with(|| a.trim().cmp(b.trim()))
}

/// Total order for alphabetical partitions: label, then profile, then identity.
pub fn compare_entries(a: &AppEntry, b: &AppEntry) -> Ordering {
	compare_labels(&a.label, &b.label)
		.then_with(|| a.identity.profile.cmp(&b.identity.profile))
		.then_with(|| a.identity.cmp(&b.identity))
}

#[cfg(test)]
mod tests {
	use shelf_primitives::{AppIdentity, IconRef};

	use super::*;

	#[test]
	fn case_does_not_dominate_order() {
		let mut labels = vec!["banana", "Apple", "apple pie", "Cherry"];
		labels.sort_by(|a, b| compare_labels(a, b));
		assert_eq!(labels, ["Apple", "apple pie", "banana", "Cherry"]);
	}

	#[test]
	fn folded_ties_fall_back_to_raw_label() {
		assert_eq!(compare_labels("Mail", "mail"), Ordering::Less);
		assert_eq!(compare_labels(" Mail ", "Mail"), Ordering::Equal);
	}

	#[test]
	fn equal_labels_order_by_profile() {
		let work = AppEntry::new(AppIdentity::new("org.mail", "Main", 10), "Mail", IconRef(1));
		let me = AppEntry::new(AppIdentity::new("org.mail", "Main", 0), "Mail", IconRef(2));
		assert_eq!(compare_entries(&me, &work), Ordering::Less);
	}
}
