//! Tasks that turn collaborator pushes into rebuild causes.

use std::sync::Arc;

use shelf_primitives::{PinSet, SuggestionList};
use shelf_sources::{PackageEvent, ProfileEvent, SuggestionFeed};
use shelf_worker::{GenerationToken, RecomputeTrigger, TaskClass};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use super::gather::LiveInputs;
use super::{Cause, Shared};
use crate::{Degradation, SourceSet};

/// Every receiver one attach holds. Opened synchronously so no push between
/// `attach` returning and the pumps starting is lost.
pub(super) struct Subscriptions {
	packages: broadcast::Receiver<PackageEvent>,
	profiles: broadcast::Receiver<ProfileEvent>,
	pins: Option<watch::Receiver<PinSet>>,
	suggestions: Option<watch::Receiver<SuggestionList>>,
}

impl Subscriptions {
	pub(super) fn open(shared: &Shared) -> (Self, LiveInputs) {
		let sources = &shared.sources;
		let reads = shared.config.sources;
		let pins = sources.pins.as_ref().filter(|_| reads.contains(SourceSet::PINS)).map(|store| store.observe());
		let suggestions = sources
			.suggestions
			.as_ref()
			.filter(|_| reads.contains(SourceSet::SUGGESTIONS))
			.map(|feed| feed.subscribe());

		let live = LiveInputs {
			pins: pins.clone(),
			suggestions: suggestions.clone(),
		};
		let subscriptions = Self {
			packages: sources.catalog.package_events(),
			profiles: sources.profiles.availability_events(),
			pins,
			suggestions,
		};
		(subscriptions, live)
	}
}

pub(super) fn spawn_all(shared: &Arc<Shared>, subscriptions: Subscriptions, token: &GenerationToken) -> Vec<JoinHandle<()>> {
	let trigger = &shared.trigger;
	let mut tasks = vec![
		shelf_worker::spawn(
			TaskClass::SourcePump,
			"reconciler.pump.packages",
			forward_events(trigger.clone(), token.child(), subscriptions.packages),
		),
		shelf_worker::spawn(
			TaskClass::SourcePump,
			"reconciler.pump.profiles",
			forward_events(trigger.clone(), token.child(), subscriptions.profiles),
		),
	];

	if let Some(rx) = subscriptions.pins {
		tasks.push(shelf_worker::spawn(
			TaskClass::SourcePump,
			"reconciler.pump.pins",
			forward_changes(trigger.clone(), token.child(), rx, Cause::PinsChanged),
		));
	}

	if let (Some(rx), Some(feed)) = (subscriptions.suggestions, shared.sources.suggestions.clone()) {
		let trigger = trigger.clone();
		let token = token.child();
		let view = shared.config.name.clone();
		tasks.push(shelf_worker::spawn(TaskClass::SourcePump, "reconciler.pump.suggestions", async move {
			request_suggestions(&view, feed.as_ref()).await;
			forward_changes(trigger, token, rx, Cause::SuggestionsChanged).await;
		}));
	}

	tasks
}

async fn request_suggestions(view: &str, feed: &dyn SuggestionFeed) {
	if let Err(err) = feed.request_update().await {
		tracing::warn!(
			view,
			kind = Degradation::SourceUnavailable.as_str(),
			subject = "suggestions",
			error = %err,
			"reconciler.degraded"
		);
	}
}

async fn forward_events<E>(trigger: RecomputeTrigger<Cause>, token: GenerationToken, mut rx: broadcast::Receiver<E>)
where
	E: Clone + Into<Cause>,
{
	loop {
		let received = tokio::select! {
			biased;
			() = token.cancelled() => break,
			received = rx.recv() => received,
		};
		match received {
			Ok(event) => {
				let cause = event.into();
				tracing::trace!(?cause, "reconciler.event");
				trigger.fire(cause);
			}
			Err(RecvError::Lagged(skipped)) => {
				tracing::warn!(skipped, "reconciler.events_lagged");
				trigger.fire(Cause::Resync);
			}
			Err(RecvError::Closed) => break,
		}
	}
}

async fn forward_changes<T>(trigger: RecomputeTrigger<Cause>, token: GenerationToken, mut rx: watch::Receiver<T>, cause: Cause) {
	loop {
		let changed = tokio::select! {
			biased;
			() = token.cancelled() => break,
			changed = rx.changed() => changed,
		};
		if changed.is_err() {
			break;
		}
		trigger.fire(cause.clone());
	}
}
