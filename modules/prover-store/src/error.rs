use thiserror::Error;

/// Errors raised while importing a store snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(String),

    #[error("snapshot has no version tag")]
    MissingVersion,

    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("duplicate record id {0} in snapshot")]
    DuplicateId(u64),

    #[error("next_id {next_id} does not exceed record id {id}")]
    StaleCounter { next_id: u64, id: u64 },

    #[error("next_id {0} is below the first id")]
    CounterOutOfRange(u64),
}
