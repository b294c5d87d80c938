//! The pure state transition.

use chrono::{DateTime, Utc};
use prover_store::{ProofSystem, SnarkStatus, Store, Submission};

use crate::body;
use crate::command::{Command, Effect};

pub const CREATED: u16 = 201;
pub const OK: u16 = 200;
pub const NOT_FOUND: u16 = 404;
pub const UNAVAILABLE: u16 = 503;

const NOT_FOUND_MESSAGE: &str = "SNARK not found";

/// Applies one command to a snapshot.
///
/// Total: every command yields effects and a next snapshot, and unknown ids
/// are reported as 404 responses rather than errors. A submit against an
/// exhausted id counter is answered with 503 and leaves the store unchanged.
/// `store` itself is never modified; read commands return an equal copy.
/// Effects are ordered response first, then log.
pub fn dispatch(store: &Store, command: Command) -> (Vec<Effect>, Store) {
    match command {
        Command::Submit {
            proof,
            public_inputs,
            verification_key,
            proof_system,
            submitter,
            notes,
            now,
        } => submit(
            store,
            proof,
            public_inputs,
            verification_key,
            proof_system,
            submitter,
            notes,
            now,
        ),
        Command::Get { id } => get(store, id),
        Command::List => list(store),
        Command::Delete { id } => delete(store, id),
        Command::UpdateStatus {
            id,
            status,
            error_message,
        } => update_status(store, id, status, error_message),
    }
}

#[allow(clippy::too_many_arguments)]
fn submit(
    store: &Store,
    proof: String,
    public_inputs: Vec<String>,
    verification_key: String,
    proof_system: ProofSystem,
    submitter: String,
    notes: String,
    now: DateTime<Utc>,
) -> (Vec<Effect>, Store) {
    let mut next = store.clone();
    let inserted = next.insert(Submission {
        proof,
        public_inputs,
        verification_key,
        proof_system,
        submitter: submitter.clone(),
        notes,
        submitted: now,
    });

    let Some(id) = inserted else {
        let effects = vec![
            Effect::response(UNAVAILABLE, body::error("SNARK id space exhausted")),
            Effect::error(format!(
                "SNARK id space exhausted at #{}; submission by {submitter} dropped",
                store.next_id()
            )),
        ];
        return (effects, store.clone());
    };

    let effects = vec![
        Effect::response(CREATED, body::created(id, "SNARK submitted successfully")),
        Effect::log(format!("SNARK #{id} submitted by {submitter}")),
    ];
    (effects, next)
}

fn get(store: &Store, id: u64) -> (Vec<Effect>, Store) {
    let effects = match store.get(id) {
        Some(record) => vec![Effect::response(OK, body::detail(record))],
        None => not_found(id),
    };
    (effects, store.clone())
}

fn list(store: &Store) -> (Vec<Effect>, Store) {
    let effects = vec![Effect::response(OK, body::list(store.records()))];
    (effects, store.clone())
}

fn delete(store: &Store, id: u64) -> (Vec<Effect>, Store) {
    if !store.contains(id) {
        return (not_found(id), store.clone());
    }

    let mut next = store.clone();
    next.remove(id);
    let effects = vec![
        Effect::response(OK, body::success("SNARK deleted")),
        Effect::log(format!("SNARK #{id} deleted")),
    ];
    (effects, next)
}

fn update_status(
    store: &Store,
    id: u64,
    status: SnarkStatus,
    error_message: Option<String>,
) -> (Vec<Effect>, Store) {
    if !store.contains(id) {
        return (not_found(id), store.clone());
    }

    let discarded = error_message.is_some() && !status.is_failure();
    let mut next = store.clone();
    next.set_status(id, status, error_message);

    let mut effects = vec![
        Effect::response(OK, body::success("Status updated")),
        Effect::log(format!("SNARK #{id} status -> {status}")),
    ];
    if discarded {
        effects.push(Effect::error(format!(
            "SNARK #{id}: error message discarded for status {status}"
        )));
    }
    (effects, next)
}

fn not_found(id: u64) -> Vec<Effect> {
    vec![
        Effect::response(NOT_FOUND, body::error(NOT_FOUND_MESSAGE)),
        Effect::log(format!("SNARK #{id} not found")),
    ]
}
