//! Command ingress and effect egress.

use chrono::{DateTime, Utc};
use prover_store::{ProofSystem, SnarkStatus};
use serde::{Deserialize, Serialize};

/// A request to change or read the store. Closed set, matched exhaustively
/// by `dispatch`.
///
/// Establishing the initial state is not a command; see `Store::new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Submit {
        proof: String,
        public_inputs: Vec<String>,
        verification_key: String,
        proof_system: ProofSystem,
        submitter: String,
        notes: String,
        /// Submission time, captured by the caller.
        now: DateTime<Utc>,
    },
    Get {
        id: u64,
    },
    List,
    Delete {
        id: u64,
    },
    UpdateStatus {
        id: u64,
        status: SnarkStatus,
        error_message: Option<String>,
    },
}

impl Command {
    /// Snake-case tag used for journaling and tracing.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Submit { .. } => "submit",
            Command::Get { .. } => "get",
            Command::List => "list",
            Command::Delete { .. } => "delete",
            Command::UpdateStatus { .. } => "update_status",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Command::Get { .. } | Command::List)
    }
}

/// An observable output of one transition, realized by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Wire response: HTTP-equivalent status code plus JSON body text.
    Response { code: u16, body: String },
    Log { message: String },
    Error { message: String },
}

impl Effect {
    pub fn response(code: u16, body: String) -> Self {
        Effect::Response { code, body }
    }

    pub fn log(message: impl Into<String>) -> Self {
        Effect::Log {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Effect::Error {
            message: message.into(),
        }
    }
}

/// First response effect in a list, as `(code, body)`.
pub fn find_response(effects: &[Effect]) -> Option<(u16, &str)> {
    effects.iter().find_map(|effect| match effect {
        Effect::Response { code, body } => Some((*code, body.as_str())),
        _ => None,
    })
}
