//! Versioned in-memory state for SNARK submission tracking.
//!
//! A `Store` is a plain value: the engine clones it, applies one transition,
//! and hands back the new snapshot. Nothing here reads a clock or does I/O.

pub mod error;
pub mod store;
pub mod types;

pub use error::SnapshotError;
pub use store::{Store, StoreVersion};
pub use types::{ProofSystem, Record, SnarkStatus, Submission};
