//! App list reconciliation.
//!
//! A [`Reconciler`] subscribes to the collaborators in [`Sources`], rebuilds
//! one deduplicated, filtered and ordered app list whenever any of them
//! changes, and publishes it as an immutable [`Snapshot`]. Three view
//! presets share the same algorithm (see [`ViewConfig`]):
//!
//! | Preset | Sources | Ordering |
//! |---|---|---|
//! | [`ViewConfig::quick_access`] | pins, suggestions | pins in persisted order, then suggestions by rank |
//! | [`ViewConfig::full_catalog`] | catalog | alphabetical, profile suffixed labels |
//! | [`ViewConfig::pinnable_catalog`] | catalog, pins | pinned first, each partition alphabetical |
//!
//! Persisted pins that no longer resolve to an enabled, eligible entry point
//! are deleted from the [`PinStore`](shelf_sources::PinStore) in the cycle
//! that discovers them.

pub mod assemble;
pub mod collate;
pub mod config;
mod error;
pub mod publisher;
mod reconciler;
pub mod validator;

pub use assemble::{RebuildInputs, assemble};
pub use config::{OrderingPolicy, PartitionOrder, SourceSet, ViewConfig, ViewPreset};
pub use error::{ConfigError, Degradation, Result};
pub use publisher::{Snapshot, SnapshotPublisher, SnapshotStream};
pub use reconciler::{CommandTicket, Reconciler, Sources};
pub use validator::Validator;
