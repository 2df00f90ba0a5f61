use thiserror::Error;

use crate::IconRef;

/// Why an identity no longer resolves to a showable entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum InvalidReason {
	#[error("package is not installed")]
	NotInstalled,
	#[error("package is disabled")]
	Disabled,
	#[error("entry point is not eligible")]
	NotEligible,
}

/// Result of re-checking one identity against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
	Valid { label: String, icon: IconRef },
	Invalid(InvalidReason),
}

impl Validity {
	/// Whether the identity still resolves.
	pub fn is_valid(&self) -> bool {
		matches!(self, Self::Valid { .. })
	}
}
