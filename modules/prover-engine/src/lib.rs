//! Command dispatch for SNARK submission tracking.
//!
//! `dispatch` is a pure transition: store snapshot + command in, effects +
//! next snapshot out. `query` is its read-only side channel. `Kernel` owns
//! the current snapshot, serializes commits and journals mutating commands.

pub mod body;
pub mod command;
pub mod dispatch;
pub mod journal;
pub mod kernel;
pub mod query;

pub use command::{find_response, Command, Effect};
pub use dispatch::dispatch;
pub use journal::{replay, replay_onto, CommandJournal, JournalEntry, MemoryJournal};
pub use kernel::Kernel;
pub use query::{query, QueryData, QueryResult, Selector};

pub use prover_store::{ProofSystem, Record, SnarkStatus, Store};
