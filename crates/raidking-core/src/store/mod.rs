//! Local persistence of the guild document.
//!
//! The guild lives in a single JSON file wrapped in a `Snapshot` that records
//! when it was written. `JsonStore` implements `RosterSink`, the interface
//! the UI pushes `Change` batches through.

pub mod json;
pub mod snapshot;

pub use json::JsonStore;
pub use snapshot::Snapshot;

use anyhow::Result;

use crate::guild::Change;

/// Destination for the changes produced by guild operations.
///
/// One call carries everything one user action changed; implementations
/// should make the whole batch durable together.
pub trait RosterSink {
    fn apply(&mut self, changes: &[Change]) -> Result<()>;
}
