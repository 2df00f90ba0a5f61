use shelf_primitives::AppIdentity;
use thiserror::Error;

/// Failures reported by collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
	/// The collaborator cannot be reached right now.
	#[error("source unavailable: {0}")]
	Unavailable(String),

	/// One entry of a larger enumeration could not be read.
	#[error("failed to read {identity}: {message}")]
	Entry {
		identity: AppIdentity,
		message: String,
	},

	/// The collaborator shut down.
	#[error("source closed")]
	Closed,
}

pub type Result<T> = std::result::Result<T, SourceError>;
