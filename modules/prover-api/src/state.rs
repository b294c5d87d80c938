use std::sync::Arc;

use prover_engine::{Kernel, MemoryJournal};

pub type AppKernel = Kernel<Arc<MemoryJournal>>;

/// Shared server state. The kernel serializes commits itself, so handlers
/// only need `&AppState`.
pub struct AppState {
    pub kernel: AppKernel,
    pub journal: Arc<MemoryJournal>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_journal(MemoryJournal::new())
    }

    /// State whose journal keeps at most `max_entries` before compacting.
    pub fn with_max_journal_entries(max_entries: usize) -> Self {
        Self::with_journal(MemoryJournal::with_max_entries(max_entries))
    }

    fn with_journal(journal: MemoryJournal) -> Self {
        let journal = Arc::new(journal);
        Self {
            kernel: Kernel::new(journal.clone()),
            journal,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
