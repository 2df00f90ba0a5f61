//! Interfaces of the collaborators an app list reconciler consumes.
//!
//! | Collaborator | Reads | Pushes |
//! |---|---|---|
//! | [`CatalogProvider`] | per-profile enumeration, per-identity eligibility | [`PackageEvent`] |
//! | [`ProfileDirectory`] | allowed profiles | [`ProfileEvent`] |
//! | [`PinStore`] | persisted [`PinSet`](shelf_primitives::PinSet) | latest `PinSet` |
//! | [`SuggestionFeed`] | - | latest [`SuggestionList`](shelf_primitives::SuggestionList) |
//!
//! Push streams are tokio channels: `broadcast` for discrete events, `watch`
//! for latest-value sources. Dropping a receiver releases the subscription.
//!
//! The [`memory`] module provides in-process implementations of every
//! collaborator.

mod catalog;
mod error;
pub mod memory;
mod pins;
mod profiles;
mod suggestions;

pub use catalog::{CatalogProvider, EntryResult, PackageEvent};
pub use error::{Result, SourceError};
pub use pins::PinStore;
pub use profiles::{ProfileDirectory, ProfileEvent};
pub use suggestions::SuggestionFeed;
