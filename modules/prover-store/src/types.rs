use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Status ---

/// Verification status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnarkStatus {
    Pending,
    Verified,
    Failed,
    Error,
}

impl SnarkStatus {
    pub const ALL: [SnarkStatus; 4] = [
        SnarkStatus::Pending,
        SnarkStatus::Verified,
        SnarkStatus::Failed,
        SnarkStatus::Error,
    ];

    /// Statuses that may carry an error message.
    pub fn is_failure(&self) -> bool {
        matches!(self, SnarkStatus::Failed | SnarkStatus::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SnarkStatus::Pending => "pending",
            SnarkStatus::Verified => "verified",
            SnarkStatus::Failed => "failed",
            SnarkStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for SnarkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SnarkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SnarkStatus::Pending),
            "verified" => Ok(SnarkStatus::Verified),
            "failed" => Ok(SnarkStatus::Failed),
            "error" => Ok(SnarkStatus::Error),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

// --- Proof system ---

/// Proof system identifier, e.g. `groth16`.
///
/// Stored and compared as an opaque symbol. `is_known` is informational;
/// nothing in the store rejects an unfamiliar system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProofSystem(String);

impl ProofSystem {
    pub const KNOWN: [&'static str; 3] = ["groth16", "plonk", "stark"];

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(&self.0.as_str())
    }
}

impl std::fmt::Display for ProofSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProofSystem {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProofSystem {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// --- Record ---

/// One tracked submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    /// Base64 proof bytes, carried as text.
    pub proof: String,
    pub public_inputs: Vec<String>,
    /// Base64 verification key, carried as text.
    pub verification_key: String,
    pub proof_system: ProofSystem,
    pub submitter: String,
    pub submitted: DateTime<Utc>,
    pub status: SnarkStatus,
    pub error_message: Option<String>,
    pub notes: String,
}

impl Record {
    /// Builds a fresh `Pending` record for an allocated id.
    pub fn new(id: u64, submission: Submission) -> Self {
        Self {
            id,
            proof: submission.proof,
            public_inputs: submission.public_inputs,
            verification_key: submission.verification_key,
            proof_system: submission.proof_system,
            submitter: submission.submitter,
            submitted: submission.submitted,
            status: SnarkStatus::Pending,
            error_message: None,
            notes: submission.notes,
        }
    }

    /// Copy of this record with a new status/error pair. Every other field is
    /// carried over untouched. A message is only kept for failure statuses.
    pub fn with_status(&self, status: SnarkStatus, error_message: Option<String>) -> Self {
        Self {
            status,
            error_message: error_message.filter(|_| status.is_failure()),
            ..self.clone()
        }
    }
}

/// Everything a caller supplies to create a record. The id, status and
/// error message are owned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub proof: String,
    pub public_inputs: Vec<String>,
    pub verification_key: String,
    pub proof_system: ProofSystem,
    pub submitter: String,
    pub notes: String,
    pub submitted: DateTime<Utc>,
}
