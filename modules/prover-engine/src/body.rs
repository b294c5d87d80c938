//! JSON response bodies.
//!
//! Everything goes through `serde_json`, so quotes, backslashes and control
//! characters in free-text fields (`submitter`, `notes`, `error_message`) are
//! escaped and the output is always valid JSON.

use prover_store::Record;
use serde_json::{json, Value};

use crate::query::QueryData;

/// Full projection of one record, as returned by `GET /snark/{id}`.
pub fn detail_value(record: &Record) -> Value {
    json!({
        "id": record.id,
        "proof": record.proof,
        "public_inputs": record.public_inputs,
        "verification_key": record.verification_key,
        "proof_system": record.proof_system,
        "submitter": record.submitter,
        "submitted": record.submitted.to_rfc3339(),
        "status": record.status,
        "error_message": record.error_message,
        "notes": record.notes,
    })
}

pub fn detail(record: &Record) -> String {
    detail_value(record).to_string()
}

/// List-view projection: no payloads.
pub fn summary(record: &Record) -> Value {
    json!({
        "id": record.id,
        "proof_system": record.proof_system,
        "submitter": record.submitter,
        "submitted": record.submitted.to_rfc3339(),
        "status": record.status,
        "notes": record.notes,
    })
}

pub fn list<'a>(records: impl Iterator<Item = &'a Record>) -> String {
    let snarks: Vec<Value> = records.map(summary).collect();
    let total = snarks.len();
    json!({ "snarks": snarks, "total": total }).to_string()
}

pub fn created(id: u64, message: &str) -> String {
    json!({ "success": true, "id": id, "message": message }).to_string()
}

pub fn success(message: &str) -> String {
    json!({ "success": true, "message": message }).to_string()
}

pub fn error(message: &str) -> String {
    json!({ "error": message }).to_string()
}

/// JSON form of a matched query, for the inspection endpoint.
pub fn query_data(data: &QueryData) -> Value {
    match data {
        QueryData::Count(n) => json!(n),
        QueryData::NextId(n) => json!(n),
        QueryData::Record(record) => detail_value(record),
        QueryData::Records(pairs) => {
            Value::Array(pairs.iter().map(|(_, record)| detail_value(record)).collect())
        }
    }
}
