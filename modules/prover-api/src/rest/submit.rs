use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use prover_common::ProverError;
use prover_engine::{Command, ProofSystem};
use serde::Deserialize;
use tracing::warn;

use super::realize;
use crate::error::ApiError;
use crate::AppState;

/// `POST /api/v1/snark` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct SnarkSubmission {
    pub proof: String,
    #[serde(default)]
    pub public_inputs: Vec<String>,
    pub verification_key: String,
    pub proof_system: String,
    pub submitter: String,
    pub notes: Option<String>,
}

/// Field checks the kernel leaves to the transport: required fields and
/// base64 payloads.
pub fn validate_submission(submission: &SnarkSubmission) -> Result<(), ProverError> {
    let fail = |msg: &str| Err(ProverError::Validation(msg.to_string()));

    if submission.proof.is_empty() {
        return fail("Proof data is required");
    }
    if submission.verification_key.is_empty() {
        return fail("Verification key is required");
    }
    if submission.submitter.trim().is_empty() {
        return fail("Submitter is required");
    }
    if submission.proof_system.trim().is_empty() {
        return fail("Proof system is required");
    }
    if STANDARD.decode(&submission.proof).is_err() {
        return fail("Invalid Base64 in proof data");
    }
    if STANDARD.decode(&submission.verification_key).is_err() {
        return fail("Invalid Base64 in verification key");
    }
    Ok(())
}

pub async fn api_submit(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SnarkSubmission>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(submission) = body?;
    validate_submission(&submission)?;

    let proof_system = ProofSystem::new(submission.proof_system.trim());
    if !proof_system.is_known() {
        warn!(proof_system = %proof_system, "Unrecognized proof system, storing as-is");
    }

    let command = Command::Submit {
        proof: submission.proof,
        public_inputs: submission.public_inputs,
        verification_key: submission.verification_key,
        proof_system,
        submitter: submission.submitter,
        notes: submission.notes.unwrap_or_default(),
        now: chrono::Utc::now(),
    };

    let effects = state.kernel.dispatch(command).await?;
    Ok(realize(effects))
}
