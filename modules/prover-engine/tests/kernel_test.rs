//! Kernel commit path: journaling, replay, concurrent reads.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use prover_engine::{
    find_response, replay, Command, CommandJournal, JournalEntry, Kernel, MemoryJournal,
    ProofSystem, QueryData, QueryResult, Selector, SnarkStatus,
};

fn submit(submitter: &str) -> Command {
    Command::Submit {
        proof: "cHJvb2Y=".into(),
        public_inputs: vec!["7".into()],
        verification_key: "dms=".into(),
        proof_system: ProofSystem::new("stark"),
        submitter: submitter.into(),
        notes: String::new(),
        now: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Journal that always fails (commit must not happen)
// ---------------------------------------------------------------------------

struct BrokenJournal;

#[async_trait]
impl CommandJournal for BrokenJournal {
    async fn append(&self, _command: &Command) -> Result<JournalEntry> {
        bail!("disk on fire")
    }

    async fn entries(&self) -> Result<Vec<JournalEntry>> {
        Ok(vec![])
    }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn dispatch_commits_new_snapshot() {
    let kernel = Kernel::new(MemoryJournal::new());

    let effects = kernel.dispatch(submit("alice")).await.unwrap();
    assert_eq!(find_response(&effects).unwrap().0, 201);

    let snapshot = kernel.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.next_id(), 2);
}

#[tokio::test]
async fn only_mutating_commands_are_journaled() {
    let journal = Arc::new(MemoryJournal::new());
    let kernel = Kernel::new(journal.clone());

    kernel.dispatch(submit("alice")).await.unwrap();
    kernel.dispatch(Command::Get { id: 1 }).await.unwrap();
    kernel.dispatch(Command::List).await.unwrap();
    kernel.dispatch(Command::Delete { id: 7 }).await.unwrap();

    let entries = journal.entries().await.unwrap();
    let kinds: Vec<&str> = entries.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["submit", "delete"]);
    assert_eq!(entries[0].seq, 1);
    assert_eq!(entries[1].seq, 2);
}

#[tokio::test]
async fn replay_reproduces_committed_snapshot() {
    let journal = Arc::new(MemoryJournal::new());
    let kernel = Kernel::new(journal.clone());

    kernel.dispatch(submit("alice")).await.unwrap();
    kernel.dispatch(submit("bob")).await.unwrap();
    kernel.dispatch(submit("carol")).await.unwrap();
    kernel.dispatch(Command::Delete { id: 2 }).await.unwrap();
    kernel
        .dispatch(Command::UpdateStatus {
            id: 3,
            status: SnarkStatus::Failed,
            error_message: Some("bad proof".into()),
        })
        .await
        .unwrap();

    let rebuilt = replay(&journal.entries().await.unwrap()).unwrap();
    assert_eq!(rebuilt, *kernel.snapshot().await);
    assert_eq!(rebuilt.next_id(), 4);
}

#[tokio::test]
async fn replay_rejects_garbage_payloads() {
    let entry = JournalEntry {
        seq: 1,
        ts: Utc::now(),
        kind: "submit".into(),
        payload: serde_json::json!({"type": "launch_missiles"}),
    };
    assert!(replay(&[entry]).is_err());
}

#[tokio::test]
async fn bounded_journal_compacts_into_checkpoint() {
    let journal = Arc::new(MemoryJournal::with_max_entries(3));
    let kernel = Kernel::new(journal.clone());

    for name in ["alice", "bob", "carol", "dave", "erin"] {
        kernel.dispatch(submit(name)).await.unwrap();
    }
    kernel.dispatch(Command::Delete { id: 1 }).await.unwrap();
    kernel
        .dispatch(Command::UpdateStatus {
            id: 5,
            status: SnarkStatus::Verified,
            error_message: None,
        })
        .await
        .unwrap();

    assert_eq!(journal.len(), 3);
    let seqs: Vec<i64> = journal
        .entries()
        .await
        .unwrap()
        .iter()
        .map(|e| e.seq)
        .collect();
    assert_eq!(seqs, vec![5, 6, 7]);

    let checkpoint = journal.checkpoint();
    assert_eq!(checkpoint.len(), 4);
    assert_eq!(checkpoint.next_id(), 5);

    assert_eq!(journal.restore().unwrap(), *kernel.snapshot().await);
}

#[tokio::test]
async fn compaction_drops_payloads_of_deleted_records() {
    let journal = Arc::new(MemoryJournal::with_max_entries(1));
    let kernel = Kernel::new(journal.clone());

    kernel.dispatch(submit("alice")).await.unwrap();
    kernel.dispatch(Command::Delete { id: 1 }).await.unwrap();
    kernel.dispatch(submit("bob")).await.unwrap();

    assert_eq!(journal.len(), 1);
    assert!(journal.checkpoint().is_empty());
    assert_eq!(journal.checkpoint().next_id(), 2);
    assert_eq!(journal.restore().unwrap(), *kernel.snapshot().await);
}

#[tokio::test]
async fn journal_failure_leaves_snapshot_untouched() {
    let kernel = Kernel::new(BrokenJournal);

    let err = kernel.dispatch(submit("alice")).await.unwrap_err();
    assert!(format!("{err:#}").contains("disk on fire"));

    let snapshot = kernel.snapshot().await;
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.next_id(), 1);
}

#[tokio::test]
async fn reads_work_even_when_journal_is_broken() {
    let kernel = Kernel::new(BrokenJournal);
    let effects = kernel.dispatch(Command::List).await.unwrap();
    assert_eq!(find_response(&effects).unwrap().0, 200);
}

#[tokio::test]
async fn query_sees_committed_state() {
    let kernel = Kernel::new(MemoryJournal::new());
    assert_eq!(
        kernel.query(&Selector::parse("/count")).await,
        QueryResult::Found(QueryData::Count(0))
    );

    kernel.dispatch(submit("alice")).await.unwrap();
    assert_eq!(
        kernel.query(&Selector::parse("/count")).await,
        QueryResult::Found(QueryData::Count(1))
    );
    assert_eq!(
        kernel.query(&Selector::parse("/nope")).await,
        QueryResult::Unsupported
    );
}

#[tokio::test]
async fn concurrent_submits_get_unique_ids() {
    let kernel = Arc::new(Kernel::new(MemoryJournal::new()));

    let mut handles = Vec::new();
    for i in 0..20 {
        let kernel = kernel.clone();
        handles.push(tokio::spawn(async move {
            let effects = kernel.dispatch(submit(&format!("user-{i}"))).await.unwrap();
            let (_, body) = find_response(&effects).unwrap();
            let body: serde_json::Value = serde_json::from_str(body).unwrap();
            body["id"].as_u64().unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
    assert_eq!(kernel.snapshot().await.next_id(), 21);
}

#[tokio::test]
async fn concurrent_queries_during_writes_see_whole_snapshots() {
    let kernel = Arc::new(Kernel::new(MemoryJournal::new()));

    let writer = {
        let kernel = kernel.clone();
        tokio::spawn(async move {
            for i in 0..50 {
                kernel.dispatch(submit(&format!("w{i}"))).await.unwrap();
            }
        })
    };

    let mut readers = Vec::new();
    for _ in 0..4 {
        let kernel = kernel.clone();
        readers.push(tokio::spawn(async move {
            for _ in 0..50 {
                if let QueryResult::Found(QueryData::Records(pairs)) =
                    kernel.query(&Selector::parse("/snarks")).await
                {
                    // Ids are always a gap-free prefix: no partial commit visible.
                    let ids: Vec<u64> = pairs.iter().map(|(id, _)| *id).collect();
                    let expected: Vec<u64> = (1..=ids.len() as u64).collect();
                    assert_eq!(ids, expected);
                }
                tokio::task::yield_now().await;
            }
        }));
    }

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
    assert_eq!(kernel.snapshot().await.len(), 50);
}
