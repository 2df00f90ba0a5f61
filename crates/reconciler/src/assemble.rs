//! Pure merge and ordering of one rebuild.
//!
//! [`assemble`] takes already-validated contributions from every source and
//! produces the final entry sequence. It performs no I/O, so the published
//! invariants can be checked directly against it:
//!
//! * no two entries share an identity;
//! * no entry belongs to a profile missing from `profiles`;
//! * `PinnedFirst` views keep pinned entries ahead of unpinned ones;
//! * alphabetical orders sort by collated label, then profile id.

use indexmap::IndexMap;
use shelf_primitives::{AppEntry, AppIdentity, CatalogEntry, PinSet, ProfileId, ProfileInfo};

use crate::collate::compare_entries;
use crate::{OrderingPolicy, PartitionOrder, SourceSet, ViewConfig};

/// Validated contributions gathered for one rebuild.
#[derive(Debug, Clone, Default)]
pub struct RebuildInputs {
	/// Allowed profiles.
	pub profiles: Vec<ProfileInfo>,
	/// Latest persisted pin set, unfiltered.
	pub pins: PinSet,
	/// Pins that resolved to valid entries, in persisted order.
	pub resolved_pins: Vec<CatalogEntry>,
	/// Suggestions that resolved to valid entries, in rank order.
	pub suggestions: Vec<(CatalogEntry, u32)>,
	/// Enabled catalog entries of allowed profiles, in enumeration order.
	pub catalog: Vec<CatalogEntry>,
}

/// Merges `inputs` by identity and orders them per `config`.
pub fn assemble(config: &ViewConfig, inputs: &RebuildInputs) -> Vec<AppEntry> {
	let reads_pins = config.sources.contains(SourceSet::PINS);
	let allowed = |profile: ProfileId| inputs.profiles.iter().any(|p| p.id == profile);

	let mut merged: IndexMap<AppIdentity, AppEntry> = IndexMap::new();

	if config.pins_contribute_entries() {
		for entry in &inputs.resolved_pins {
			merged.entry(entry.identity.clone()).or_insert_with(|| AppEntry::from(entry.clone()));
		}
	}

	if config.sources.contains(SourceSet::SUGGESTIONS) {
		for (entry, rank) in &inputs.suggestions {
			if config.dedup_against_pins && inputs.pins.contains(&entry.identity) {
				continue;
			}
			let slot = merged.entry(entry.identity.clone()).or_insert_with(|| AppEntry::from(entry.clone()));
			slot.suggestion_rank = Some(slot.suggestion_rank.map_or(*rank, |r| r.min(*rank)));
		}
	}

	if config.sources.contains(SourceSet::CATALOG) {
		for entry in &inputs.catalog {
			merged.entry(entry.identity.clone()).or_insert_with(|| AppEntry::from(entry.clone()));
		}
	}

	let mut entries: Vec<AppEntry> = merged
		.into_values()
		.filter(|entry| allowed(entry.identity.profile))
		.map(|mut entry| {
			entry.pinned = reads_pins && inputs.pins.contains(&entry.identity);
			if config.profile_suffix_labels
				&& let Some(profile) = inputs.profiles.iter().find(|p| p.id == entry.identity.profile)
			{
				entry.label = profile.decorate(&entry.label);
			}
			entry
		})
		.collect();

	order(config, &mut entries);
	entries
}

fn order(config: &ViewConfig, entries: &mut [AppEntry]) {
	match (config.ordering, config.partition_order) {
		(OrderingPolicy::AlphabeticalOnly, _) => entries.sort_by(compare_entries),
		(OrderingPolicy::PinnedFirst, PartitionOrder::Source) => entries.sort_by_key(|entry| !entry.pinned),
		(OrderingPolicy::PinnedFirst, PartitionOrder::Collated) => {
			entries.sort_by(|a, b| b.pinned.cmp(&a.pinned).then_with(|| compare_entries(a, b)));
		}
	}
}
