//! Read-only inspection of a snapshot by path.

use prover_store::{Record, SnarkStatus, Store};

/// Hierarchical query path, e.g. `/count` or `/snark/3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    segments: Vec<String>,
}

impl Selector {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits on `/`, ignoring empty segments.
    pub fn parse(path: &str) -> Self {
        Self::new(path.split('/').filter(|s| !s.is_empty()))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// Outcome of a query. `Unsupported` means no such query exists, which is
/// different from a known query that found nothing (`Absent`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Unsupported,
    Absent,
    Found(QueryData),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryData {
    Count(usize),
    NextId(u64),
    Record(Record),
    /// `(id, record)` pairs in ascending id order.
    Records(Vec<(u64, Record)>),
}

/// Runs a query against a snapshot. Never mutates; safe to call concurrently.
pub fn query(store: &Store, selector: &Selector) -> QueryResult {
    let segments: Vec<&str> = selector.segments().iter().map(String::as_str).collect();

    match segments.as_slice() {
        ["count"] => QueryResult::Found(QueryData::Count(store.len())),
        ["next-id"] => QueryResult::Found(QueryData::NextId(store.next_id())),
        ["snarks"] => QueryResult::Found(QueryData::Records(pairs(store.records()))),
        ["snark", id] => match id.parse::<u64>() {
            Ok(id) => match store.get(id) {
                Some(record) => QueryResult::Found(QueryData::Record(record.clone())),
                None => QueryResult::Absent,
            },
            Err(_) => QueryResult::Unsupported,
        },
        ["status", word] => match word.parse::<SnarkStatus>() {
            Ok(status) => QueryResult::Found(QueryData::Records(pairs(
                store.records().filter(|r| r.status == status),
            ))),
            Err(_) => QueryResult::Unsupported,
        },
        _ => QueryResult::Unsupported,
    }
}

fn pairs<'a>(records: impl Iterator<Item = &'a Record>) -> Vec<(u64, Record)> {
    records.map(|r| (r.id, r.clone())).collect()
}
