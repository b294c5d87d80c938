//! Command journal: an ordered log of committed mutating commands.
//!
//! Because `Submit` carries its own timestamp, folding the journal through
//! `dispatch` rebuilds the exact snapshot the kernel committed.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prover_store::Store;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::dispatch::dispatch;

/// One journaled command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: i64,
    pub ts: DateTime<Utc>,
    pub kind: String,
    pub payload: serde_json::Value,
}

/// Where the kernel records commands before committing their snapshot.
///
/// Also implemented for `Arc<J>` so tests can keep a handle for assertions.
#[async_trait]
pub trait CommandJournal: Send + Sync {
    async fn append(&self, command: &Command) -> Result<JournalEntry>;

    /// All entries in sequence order.
    async fn entries(&self) -> Result<Vec<JournalEntry>>;
}

// ---------------------------------------------------------------------------
// MemoryJournal
// ---------------------------------------------------------------------------

/// Entries kept by `MemoryJournal::new` before compaction kicks in.
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

/// In-memory journal with incrementing sequence numbers. Thread-safe.
///
/// Bounded: once more than `max_entries` commands are held, the oldest are
/// folded into a checkpoint store and dropped. `restore` replays the
/// remaining entries onto that checkpoint, so compaction never changes the
/// rebuilt snapshot. Records deleted before the checkpoint are not retained.
pub struct MemoryJournal {
    next_seq: AtomicI64,
    max_entries: usize,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    checkpoint: Store,
    entries: Vec<JournalEntry>,
}

impl Default for MemoryJournal {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// A journal that keeps at most `max_entries` (minimum 1) entries.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            next_seq: AtomicI64::new(1),
            max_entries: max_entries.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Entries currently held, after compaction.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// The store that compacted entries were folded into.
    pub fn checkpoint(&self) -> Store {
        self.lock().checkpoint.clone()
    }

    /// Rebuilds the latest store: checkpoint plus the retained entries.
    pub fn restore(&self) -> Result<Store> {
        let inner = self.lock();
        replay_onto(inner.checkpoint.clone(), &inner.entries)
    }

    // The vec and checkpoint are only replaced after every fallible step, so
    // a poisoned lock still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Inner {
    /// Folds the oldest entries into the checkpoint so that one more entry
    /// fits under `max_entries`.
    fn compact(&mut self, max_entries: usize) -> Result<()> {
        let overflow = (self.entries.len() + 1).saturating_sub(max_entries);
        if overflow == 0 {
            return Ok(());
        }

        let commands = self.entries[..overflow]
            .iter()
            .map(decode)
            .collect::<Result<Vec<_>>>()?;
        let checkpoint = std::mem::take(&mut self.checkpoint);
        self.checkpoint = commands
            .into_iter()
            .fold(checkpoint, |store, command| dispatch(&store, command).1);
        self.entries.drain(..overflow);
        Ok(())
    }
}

#[async_trait]
impl CommandJournal for MemoryJournal {
    async fn append(&self, command: &Command) -> Result<JournalEntry> {
        let payload = serde_json::to_value(command)
            .with_context(|| format!("failed to encode {} command", command.kind()))?;

        let mut inner = self.lock();
        inner.compact(self.max_entries)?;

        let entry = JournalEntry {
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
            ts: Utc::now(),
            kind: command.kind().to_string(),
            payload,
        };
        inner.entries.push(entry.clone());
        Ok(entry)
    }

    async fn entries(&self) -> Result<Vec<JournalEntry>> {
        Ok(self.lock().entries.clone())
    }
}

// ---------------------------------------------------------------------------
// Arc<J> blanket
// ---------------------------------------------------------------------------

#[async_trait]
impl<J: CommandJournal + ?Sized> CommandJournal for Arc<J> {
    async fn append(&self, command: &Command) -> Result<JournalEntry> {
        (**self).append(command).await
    }

    async fn entries(&self) -> Result<Vec<JournalEntry>> {
        (**self).entries().await
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Rebuilds a store by folding journaled commands over `Store::new()`.
pub fn replay(entries: &[JournalEntry]) -> Result<Store> {
    replay_onto(Store::new(), entries)
}

/// Folds journaled commands over an existing store.
pub fn replay_onto(base: Store, entries: &[JournalEntry]) -> Result<Store> {
    entries.iter().try_fold(base, |store, entry| {
        let (_, next) = dispatch(&store, decode(entry)?);
        Ok(next)
    })
}

fn decode(entry: &JournalEntry) -> Result<Command> {
    serde_json::from_value(entry.payload.clone())
        .with_context(|| format!("journal entry {} is not a valid command", entry.seq))
}
