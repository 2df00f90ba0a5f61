//! Core types for the app list: identities, entries, profiles, pins and suggestions.

/// Catalog and published list entries.
pub mod entry;
/// The three-part app identity key.
pub mod identity;
/// Persisted, ordered pin set.
pub mod pins;
/// User profile descriptors.
pub mod profile;
/// Ranked suggestion lists.
pub mod suggestion;
/// Per-identity eligibility outcomes.
pub mod validity;

pub use entry::{AppEntry, CatalogEntry, IconRef};
pub use identity::{AppIdentity, ParseIdentityError, ProfileId};
pub use pins::PinSet;
pub use profile::ProfileInfo;
pub use suggestion::{MAX_SUGGESTIONS, Suggestion, SuggestionList};
pub use validity::{InvalidReason, Validity};
