//! Per-identity eligibility re-check.

use shelf_primitives::{AppIdentity, CatalogEntry, InvalidReason, Validity};
use shelf_sources::{CatalogProvider, SourceError};

/// Resolves identities against the catalog.
///
/// An identity is valid when it is installed, eligible for the target
/// windowing mode, and enabled. Errors from the catalog are returned as-is;
/// they mean "unknown", never "invalid".
#[derive(Clone, Copy)]
pub struct Validator<'a> {
	catalog: &'a dyn CatalogProvider,
}

impl<'a> Validator<'a> {
	/// Validator backed by `catalog`.
	pub fn new(catalog: &'a dyn CatalogProvider) -> Self {
		Self { catalog }
	}

	/// Re-checks `identity`, treating a disabled entry point as invalid.
	pub async fn validate(&self, identity: &AppIdentity) -> Result<Validity, SourceError> {
		let validity = self.catalog.check_eligible(identity).await?;
		let Validity::Valid { label, icon } = validity else {
			return Ok(validity);
		};
		if !self.catalog.is_enabled(identity).await? {
			return Ok(Validity::Invalid(InvalidReason::Disabled));
		}
		Ok(Validity::Valid { label, icon })
	}

	/// Resolves `identity` into a catalog entry, or the reason it cannot be.
	pub async fn resolve(&self, identity: &AppIdentity) -> Result<Result<CatalogEntry, InvalidReason>, SourceError> {
		Ok(match self.validate(identity).await? {
			Validity::Valid { label, icon } => Ok(CatalogEntry::new(identity.clone(), label, icon)),
			Validity::Invalid(reason) => Err(reason),
		})
	}
}

#[cfg(test)]
mod tests {
	use shelf_primitives::ProfileId;
	use shelf_sources::memory::MemoryCatalog;

	use super::*;

	fn mail() -> AppIdentity {
		AppIdentity::new("org.mail", "Main", 0)
	}

	#[tokio::test]
	async fn classifies_each_failure_reason() {
		let catalog = MemoryCatalog::new();
		let validator = Validator::new(&catalog);
		assert_eq!(validator.validate(&mail()).await, Ok(Validity::Invalid(InvalidReason::NotInstalled)));

		catalog.install_app(mail(), "Mail");
		assert!(validator.validate(&mail()).await.unwrap().is_valid());

		catalog.set_package_enabled("org.mail", ProfileId(0), false);
		assert_eq!(validator.validate(&mail()).await, Ok(Validity::Invalid(InvalidReason::Disabled)));

		catalog.set_package_enabled("org.mail", ProfileId(0), true);
		catalog.set_eligible(&mail(), false);
		assert_eq!(validator.validate(&mail()).await, Ok(Validity::Invalid(InvalidReason::NotEligible)));
	}

	#[tokio::test]
	async fn catalog_errors_are_not_invalid() {
		let catalog = MemoryCatalog::new();
		catalog.install_app(mail(), "Mail");
		catalog.set_unavailable(true);

		let err = Validator::new(&catalog).validate(&mail()).await.unwrap_err();
		assert!(matches!(err, SourceError::Unavailable(_)));
	}

	#[tokio::test]
	async fn resolve_builds_entries_from_valid_identities() {
		let catalog = MemoryCatalog::new();
		catalog.install_app(mail(), "Mail");
		let entry = Validator::new(&catalog).resolve(&mail()).await.unwrap().unwrap();
		assert_eq!(entry.label, "Mail");
		assert_eq!(entry.identity, mail());
	}
}
