use std::collections::HashSet;
use std::fmt;

use shelf_primitives::{AppIdentity, PinSet, ProfileId, ProfileInfo, SuggestionList};
use shelf_sources::SourceError;
use tokio::sync::watch;

use super::Shared;
use crate::{Degradation, RebuildInputs, SourceSet, Validator};

/// Latest-value receivers the run loop reads at rebuild time.
pub(super) struct LiveInputs {
	pub(super) pins: Option<watch::Receiver<PinSet>>,
	pub(super) suggestions: Option<watch::Receiver<SuggestionList>>,
}

impl LiveInputs {
	pub(super) fn pins(&self) -> PinSet {
		self.pins.as_ref().map(|rx| rx.borrow().clone()).unwrap_or_default()
	}

	pub(super) fn suggestions(&self) -> SuggestionList {
		self.suggestions.as_ref().map(|rx| rx.borrow().clone()).unwrap_or_default()
	}
}

/// Counters reported once per rebuild.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct RebuildStats {
	pub(super) catalog: usize,
	pub(super) pins: usize,
	pub(super) suggestions: usize,
	pub(super) skipped: usize,
	pub(super) stale: usize,
	pub(super) degraded: usize,
}

impl RebuildStats {
	fn degrade(&mut self, kind: Degradation, subject: &dyn fmt::Display, err: &dyn fmt::Display) {
		match kind {
			Degradation::StaleIdentity => {
				self.stale += 1;
				tracing::debug!(kind = kind.as_str(), %subject, reason = %err, "reconciler.degraded");
			}
			_ => {
				self.degraded += 1;
				tracing::warn!(kind = kind.as_str(), %subject, error = %err, "reconciler.degraded");
			}
		}
	}
}

/// Result of one full gather.
pub(super) struct Gathered {
	pub(super) inputs: RebuildInputs,
	/// Persisted pins found invalid; deleted after publishing.
	pub(super) stale: Vec<AppIdentity>,
	pub(super) stats: RebuildStats,
}

fn degradation_of(err: &SourceError) -> Degradation {
	match err {
		SourceError::Entry { .. } => Degradation::PartialEnumerationFailure,
		SourceError::Unavailable(_) | SourceError::Closed => Degradation::SourceUnavailable,
	}
}

/// Reads every configured source and validates its contribution.
///
/// `last_allowed` is the allowed profile list of the previous rebuild; it is
/// reused when the profile directory cannot be reached and replaced otherwise.
pub(super) async fn gather(shared: &Shared, live: &LiveInputs, last_allowed: &mut Vec<ProfileInfo>) -> Gathered {
	let config = &shared.config;
	let sources = &shared.sources;
	let validator = Validator::new(sources.catalog.as_ref());
	let mut stats = RebuildStats::default();
	let mut stale = Vec::new();

	let profiles = match sources.profiles.list_allowed().await {
		Ok(profiles) => {
			*last_allowed = profiles.into_iter().filter(|profile| profile.allowed).collect();
			last_allowed.clone()
		}
		Err(err) => {
			stats.degrade(Degradation::SourceUnavailable, &"profiles", &err);
			last_allowed.clone()
		}
	};
	let allowed: HashSet<ProfileId> = profiles.iter().map(|profile| profile.id).collect();

	let mut catalog = Vec::new();
	if config.sources.contains(SourceSet::CATALOG) {
		for profile in &profiles {
			let results = match sources.catalog.list_eligible(profile.id).await {
				Ok(results) => results,
				Err(err) => {
					stats.degrade(degradation_of(&err), &format!("catalog@{}", profile.id), &err);
					continue;
				}
			};
			for result in results {
				let entry = match result {
					Ok(entry) => entry,
					Err(err) => {
						stats.degrade(Degradation::PartialEnumerationFailure, &format!("catalog@{}", profile.id), &err);
						continue;
					}
				};
				match sources.catalog.is_enabled(&entry.identity).await {
					Ok(true) => catalog.push(entry),
					Ok(false) => stats.skipped += 1,
					Err(err) => stats.degrade(degradation_of(&err), &entry.identity, &err),
				}
			}
		}
		stats.catalog = catalog.len();
	}

	let pins = live.pins();
	let mut resolved_pins = Vec::new();
	if config.sources.contains(SourceSet::PINS) {
		let listed: HashSet<&AppIdentity> = catalog.iter().map(|entry| &entry.identity).collect();
		for identity in pins.iter() {
			// Pins of hidden profiles are kept for when the profile returns.
			if !allowed.contains(&identity.profile) || listed.contains(identity) {
				continue;
			}
			match validator.resolve(identity).await {
				Ok(Ok(entry)) => {
					if config.pins_contribute_entries() {
						resolved_pins.push(entry);
					}
				}
				Ok(Err(reason)) => {
					stats.degrade(Degradation::StaleIdentity, identity, &reason);
					stale.push(identity.clone());
				}
				Err(err) => stats.degrade(degradation_of(&err), identity, &err),
			}
		}
		stats.pins = resolved_pins.len();
	}

	let mut suggestions = Vec::new();
	if config.sources.contains(SourceSet::SUGGESTIONS) {
		let list = live.suggestions().capped(config.max_suggestions);
		for suggestion in list.iter() {
			if !allowed.contains(&suggestion.identity.profile) {
				continue;
			}
			if config.dedup_against_pins && pins.contains(&suggestion.identity) {
				continue;
			}
			match validator.resolve(&suggestion.identity).await {
				Ok(Ok(entry)) => suggestions.push((entry, suggestion.rank)),
				Ok(Err(reason)) => stats.degrade(Degradation::StaleIdentity, &suggestion.identity, &reason),
				Err(err) => stats.degrade(degradation_of(&err), &suggestion.identity, &err),
			}
		}
		stats.suggestions = suggestions.len();
	}

	Gathered {
		inputs: RebuildInputs {
			profiles,
			pins,
			resolved_pins,
			suggestions,
			catalog,
		},
		stale,
		stats,
	}
}

/// Deletes invalid pins. Failures are logged; the next rebuild that still
/// finds the pin invalid retries.
pub(super) async fn heal(shared: &Shared, stale: Vec<AppIdentity>) {
	let Some(store) = shared.sources.pins.as_ref() else {
		return;
	};
	for identity in stale {
		match store.delete(&identity).await {
			Ok(()) => tracing::info!(view = %shared.config.name, %identity, "reconciler.pin_healed"),
			Err(err) => tracing::warn!(view = %shared.config.name, %identity, error = %err, "reconciler.pin_heal_failed"),
		}
	}
}
