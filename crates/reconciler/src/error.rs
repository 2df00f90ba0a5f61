use std::path::PathBuf;

use thiserror::Error;

/// Errors building a view configuration or a reconciler from it.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to parse view config: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("I/O error reading {path}: {error}")]
	Io {
		path: PathBuf,
		error: std::io::Error,
	},

	/// The configuration is internally inconsistent.
	#[error("invalid view config: {0}")]
	Invalid(String),

	/// The view reads a source that was not provided.
	#[error("view '{view}' needs a {source_name} source")]
	MissingSource {
		view: String,
		source_name: &'static str,
	},
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Ways a rebuild can degrade without failing.
///
/// None of these reach observers; each is logged and the affected
/// contribution is omitted from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Degradation {
	/// A collaborator could not be reached; its contribution is empty.
	SourceUnavailable,
	/// An identity resolved to invalid; dropped, and healed if pinned.
	StaleIdentity,
	/// One entry of an enumeration failed; only that entry is skipped.
	PartialEnumerationFailure,
}

impl Degradation {
	/// Stable name used in logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::SourceUnavailable => "source_unavailable",
			Self::StaleIdentity => "stale_identity",
			Self::PartialEnumerationFailure => "partial_enumeration_failure",
		}
	}
}
