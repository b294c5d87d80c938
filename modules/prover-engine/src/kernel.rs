//! Owner of the current snapshot.

use std::sync::Arc;

use anyhow::{Context, Result};
use prover_store::Store;
use tokio::sync::RwLock;
use tracing::{debug, info_span, Instrument};

use crate::command::{Command, Effect};
use crate::dispatch::dispatch;
use crate::journal::CommandJournal;
use crate::query::{query, QueryResult, Selector};

/// Serializes commits over the pure `dispatch`.
///
/// Mutating commands: write lock → dispatch → journal → swap snapshot.
/// At most one commit is in flight. Reads and queries clone the current
/// `Arc<Store>` under a brief read lock and run against that immutable value,
/// so they never observe a half-applied transition.
pub struct Kernel<J: CommandJournal> {
    state: RwLock<Arc<Store>>,
    journal: J,
}

impl<J: CommandJournal> Kernel<J> {
    /// Boots from the initial (empty) snapshot.
    pub fn new(journal: J) -> Self {
        Self::with_store(Store::new(), journal)
    }

    pub fn with_store(store: Store, journal: J) -> Self {
        Self {
            state: RwLock::new(Arc::new(store)),
            journal,
        }
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> Arc<Store> {
        self.state.read().await.clone()
    }

    /// Dispatch a command and commit the resulting snapshot.
    ///
    /// If the journal rejects the command, nothing is committed and the error
    /// is returned.
    pub async fn dispatch(&self, command: Command) -> Result<Vec<Effect>> {
        let span = info_span!("dispatch", kind = command.kind());

        async move {
            if command.is_read_only() {
                let current = self.snapshot().await;
                let (effects, _) = dispatch(&current, command);
                return Ok::<_, anyhow::Error>(effects);
            }

            let mut current = self.state.write().await;
            let (effects, next) = dispatch(&current, command.clone());

            let entry = self
                .journal
                .append(&command)
                .await
                .with_context(|| format!("failed to journal {} command", command.kind()))?;
            debug!(seq = entry.seq, next_id = next.next_id(), "committing snapshot");

            *current = Arc::new(next);
            Ok::<_, anyhow::Error>(effects)
        }
        .instrument(span)
        .await
    }

    /// Run a read-only query against the current snapshot.
    pub async fn query(&self, selector: &Selector) -> QueryResult {
        let current = self.snapshot().await;
        query(&current, selector)
    }

    pub fn journal(&self) -> &J {
        &self.journal
    }
}
