use serde::{Deserialize, Serialize};

use crate::AppIdentity;

/// Maximum number of suggestions carried by one push (K).
pub const MAX_SUGGESTIONS: usize = 6;

/// One ranked suggestion. Lower rank is more relevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
	pub identity: AppIdentity,
	pub rank: u32,
}

/// Ranked suggestion list, capped at [`MAX_SUGGESTIONS`] and replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SuggestionList {
	items: Vec<Suggestion>,
}

impl SuggestionList {
	/// List with no suggestions.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Builds a list from ranked candidates.
	///
	/// Candidates are ordered by rank (ties by identity), repeated identities
	/// keep their best rank, and the result is truncated to [`MAX_SUGGESTIONS`].
	pub fn from_ranked(candidates: impl IntoIterator<Item = (AppIdentity, u32)>) -> Self {
		Self::from_ranked_capped(candidates, MAX_SUGGESTIONS)
	}

	/// Same as [`Self::from_ranked`] with an explicit cap (itself at most K).
	pub fn from_ranked_capped(candidates: impl IntoIterator<Item = (AppIdentity, u32)>, cap: usize) -> Self {
		let mut items: Vec<Suggestion> = candidates.into_iter().map(|(identity, rank)| Suggestion { identity, rank }).collect();
		items.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.identity.cmp(&b.identity)));
		let mut seen = std::collections::HashSet::new();
		items.retain(|it| seen.insert(it.identity.clone()));
		items.truncate(cap.min(MAX_SUGGESTIONS));
		Self { items }
	}

	/// Number of suggestions kept.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Whether the feed suggested nothing.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Suggestions in rank order.
	pub fn iter(&self) -> std::slice::Iter<'_, Suggestion> {
		self.items.iter()
	}

	/// Returns a copy truncated to `cap` entries.
	#[must_use]
	pub fn capped(&self, cap: usize) -> Self {
		let mut items = self.items.clone();
		items.truncate(cap);
		Self { items }
	}
}
