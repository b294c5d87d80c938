use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use prover_common::ProverError;
use tracing::error;

/// Transport-level failures. Domain misses (unknown id) never get here; they
/// arrive as ordinary response effects from the kernel.
#[derive(Debug)]
pub enum ApiError {
    /// Request content failed validation.
    Validation(String),
    /// Axum refused to extract the request (bad JSON, oversized body, bad path).
    Rejected(StatusCode, String),
    /// Kernel or journal failure.
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Rejected(status, message) => (status, message),
            ApiError::Internal(e) => {
                let detail = format!("{e:#}");
                error!(error = %detail, "Kernel dispatch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<ProverError> for ApiError {
    fn from(e: ProverError) -> Self {
        match e {
            ProverError::Validation(message) => ApiError::Validation(message),
            other => ApiError::Internal(other.into()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}
