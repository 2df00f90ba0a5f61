//! Runtime primitives shared by app list reconcilers.
//!
//! * [`spawn`] routes tasks onto the ambient tokio runtime (or a small global
//!   fallback runtime) and tags them with a [`TaskClass`].
//! * [`GenerationClock`] / [`GenerationToken`] scope cancellation to one
//!   attach/detach lifecycle.
//! * [`RecomputeTrigger`] is the depth-1 coalescing queue that serializes
//!   source events into recomputations.

mod class;
mod spawn;
mod token;
mod trigger;

pub use class::TaskClass;
pub use spawn::spawn;
pub use token::{GenerationClock, GenerationToken};
pub use trigger::{FireOutcome, RecomputeTrigger, TriggerBatch};
