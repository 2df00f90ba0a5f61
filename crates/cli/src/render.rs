use std::fmt::Write;

use serde::Serialize;
use shelf_primitives::{AppEntry, PinSet};
use shelf_reconciler::Snapshot;

#[derive(Serialize)]
struct Report<'a> {
	view: &'a str,
	version: u64,
	generation: u64,
	entries: &'a [AppEntry],
	pins: &'a PinSet,
}

/// One line per entry, pinned entries marked with `*`.
pub fn text(view: &str, snapshot: &Snapshot, pins: &PinSet) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "# {view} v{} ({} entries)", snapshot.version(), snapshot.len());
	for entry in snapshot.entries() {
		let marker = if entry.pinned { '*' } else { ' ' };
		let _ = write!(out, "{marker} {:<24} {}", entry.label, entry.identity);
		if let Some(rank) = entry.suggestion_rank {
			let _ = write!(out, " rank={rank}");
		}
		out.push('\n');
	}
	let _ = writeln!(out, "# pins: {}", pins.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "));
	out
}

/// Snapshot and the pin store contents as pretty-printed JSON.
pub fn json(view: &str, snapshot: &Snapshot, pins: &PinSet) -> serde_json::Result<String> {
	serde_json::to_string_pretty(&Report {
		view,
		version: snapshot.version(),
		generation: snapshot.generation(),
		entries: snapshot.entries(),
		pins,
	})
}
