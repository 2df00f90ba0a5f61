//! In-process collaborators.
//!
//! Each type keeps its state behind a lock and emits the same push
//! notifications a platform-backed implementation would, so reconcilers can
//! be driven end to end without an OS catalog.

mod catalog;
mod pins;
mod profiles;
mod suggestions;

pub use catalog::{AppRecord, MemoryCatalog};
pub use pins::MemoryPinStore;
pub use profiles::{MemoryProfiles, ProfileRecord};
pub use suggestions::MemorySuggestionFeed;

/// Capacity of the broadcast channels used for push events.
const EVENT_CAPACITY: usize = 256;
