pub mod submit;

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use prover_engine::{body, Command, Effect, QueryResult, Selector, SnarkStatus};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::error::ApiError;
use crate::AppState;

// --- Request bodies ---

/// `PUT /api/v1/snark/{id}/status` request body.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
    pub error_message: Option<String>,
}

// --- Effects → HTTP ---

/// Realize kernel effects: the first `Response` becomes the HTTP response,
/// `Log` and `Error` go to tracing in order.
pub fn realize(effects: Vec<Effect>) -> Response {
    let mut response = None;

    for effect in effects {
        match effect {
            Effect::Response { code, body } => {
                if response.is_none() {
                    response = Some(json_response(code, body));
                }
            }
            Effect::Log { message } => info!("{message}"),
            Effect::Error { message } => error!("{message}"),
        }
    }

    response.unwrap_or_else(|| {
        ApiError::Internal(anyhow::anyhow!("kernel produced no response")).into_response()
    })
}

fn json_response(code: u16, body: String) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

// --- Handlers ---

pub async fn api_get_snark(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let effects = state.kernel.dispatch(Command::Get { id }).await?;
    Ok(realize(effects))
}

pub async fn api_list_snarks(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let effects = state.kernel.dispatch(Command::List).await?;
    Ok(realize(effects))
}

pub async fn api_delete_snark(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let effects = state.kernel.dispatch(Command::Delete { id }).await?;
    Ok(realize(effects))
}

pub async fn api_update_status(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let Json(update) = body?;
    let status: SnarkStatus = update
        .status
        .parse()
        .map_err(|_| ApiError::Validation(format!("Unknown status: {}", update.status)))?;

    let command = Command::UpdateStatus {
        id,
        status,
        error_message: update.error_message.filter(|m| !m.is_empty()),
    };
    let effects = state.kernel.dispatch(command).await?;
    Ok(realize(effects))
}

/// Read-only inspection: `GET /api/v1/peek/{*path}`.
pub async fn api_peek(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Response {
    let selector = Selector::parse(&path);
    match state.kernel.query(&selector).await {
        QueryResult::Unsupported => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no such query", "path": selector.to_string() })),
        )
            .into_response(),
        QueryResult::Absent => Json(json!({ "data": null })).into_response(),
        QueryResult::Found(data) => {
            Json(json!({ "data": body::query_data(&data) })).into_response()
        }
    }
}

pub async fn health() -> &'static str {
    "ok"
}
