//! The store snapshot: records keyed by id plus the id counter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::types::{Record, SnarkStatus, Submission};

/// Schema revision of a store. A new layout gets a new variant and a
/// migration arm in `Store::from_snapshot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreVersion {
    V1,
}

impl StoreVersion {
    pub const CURRENT: StoreVersion = StoreVersion::V1;

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreVersion::V1 => "v1",
        }
    }
}

/// Complete tracker state at one point in time.
///
/// Fields are private so the two structural invariants hold by construction:
/// every key equals its record's id, and `next_id` exceeds every id ever
/// allocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    version: StoreVersion,
    records: BTreeMap<u64, Record>,
    next_id: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Initial snapshot: no records, first id is 1.
    pub fn new() -> Self {
        Self {
            version: StoreVersion::CURRENT,
            records: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn version(&self) -> StoreVersion {
        self.version
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn contains(&self, id: u64) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Records in ascending id order (which is also creation order).
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    // --- Transitions. Callers apply these to their own copy. ---

    /// Allocates the next id, inserts a pending record and bumps the counter.
    ///
    /// Returns `None`, leaving the store untouched, once the id space is
    /// exhausted.
    pub fn insert(&mut self, submission: Submission) -> Option<u64> {
        let id = self.next_id;
        self.next_id = id.checked_add(1)?;
        self.records.insert(id, Record::new(id, submission));
        Some(id)
    }

    /// Removes a record. The counter is left alone so the id is never reissued.
    pub fn remove(&mut self, id: u64) -> Option<Record> {
        self.records.remove(&id)
    }

    /// Replaces the status/error pair of an existing record in one step.
    pub fn set_status(
        &mut self,
        id: u64,
        status: SnarkStatus,
        error_message: Option<String>,
    ) -> Option<&Record> {
        let slot = self.records.get_mut(&id)?;
        *slot = slot.with_status(status, error_message);
        Some(slot)
    }

    // --- Snapshots ---

    /// Exports the store as a version-tagged JSON document.
    pub fn to_snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "version": self.version,
            "next_id": self.next_id,
            "records": self.records.values().collect::<Vec<_>>(),
        })
    }

    /// Imports a snapshot produced by `to_snapshot`, validating the invariants.
    ///
    /// `next_id` must be at least 1. A counter at `u64::MAX` is accepted: the
    /// store loads but `insert` refuses to allocate.
    pub fn from_snapshot(value: serde_json::Value) -> Result<Self, SnapshotError> {
        let tag = value
            .get("version")
            .and_then(|v| v.as_str())
            .ok_or(SnapshotError::MissingVersion)?;

        match tag {
            "v1" => {
                let doc: SnapshotV1 = serde_json::from_value(value)?;
                Self::from_v1(doc)
            }
            other => Err(SnapshotError::UnsupportedVersion(other.to_string())),
        }
    }

    fn from_v1(doc: SnapshotV1) -> Result<Self, SnapshotError> {
        if doc.next_id == 0 {
            return Err(SnapshotError::CounterOutOfRange(doc.next_id));
        }

        let mut records = BTreeMap::new();
        for record in doc.records {
            if record.id >= doc.next_id {
                return Err(SnapshotError::StaleCounter {
                    next_id: doc.next_id,
                    id: record.id,
                });
            }
            let id = record.id;
            if records.insert(id, record).is_some() {
                return Err(SnapshotError::DuplicateId(id));
            }
        }

        Ok(Self {
            version: StoreVersion::V1,
            records,
            next_id: doc.next_id,
        })
    }
}

#[derive(Deserialize)]
struct SnapshotV1 {
    next_id: u64,
    records: Vec<Record>,
}
