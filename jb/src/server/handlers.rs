//! Route handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ApiError;
use crate::catalog::{CatalogSummary, FieldComponent};
use crate::conversation::{ConversationEngine, StartOutcome, TurnOutcome};
use crate::domain::SessionId;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConversationEngine>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// Body of `/process`; both fields are checked by hand for a uniform 400
#[derive(Debug, Default, Deserialize)]
pub struct ProcessRequest {
    pub session_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DiagramResponse {
    pub session_id: SessionId,
    pub flow_diagram: String,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// GET|POST /start
pub async fn start(State(state): State<AppState>) -> Result<Json<StartOutcome>, ApiError> {
    debug!("start: called");
    let outcome = state.engine.start().await?;
    info!(session_id = %outcome.session_id, "Started session");
    Ok(Json(outcome))
}

/// POST /process
pub async fn process(
    State(state): State<AppState>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<TurnOutcome>, ApiError> {
    debug!("process: called");
    let Json(request) = body.map_err(|e| {
        debug!(error = %e, "process: unreadable body");
        ApiError::InvalidSession
    })?;

    let session_id = request
        .session_id
        .filter(|s| !s.trim().is_empty())
        .ok_or(ApiError::InvalidSession)?;
    let message = request.message.ok_or(ApiError::InvalidSession)?;

    let outcome = state.engine.process(&SessionId::from(session_id), &message).await?;
    Ok(Json(outcome))
}

/// GET /field-components/:name
pub async fn field_components(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<FieldComponent>>, ApiError> {
    debug!(%name, "field_components: called");
    Ok(Json(state.engine.field_components(&name).await?))
}

/// GET /components
pub async fn components(State(state): State<AppState>) -> Result<Json<Vec<CatalogSummary>>, ApiError> {
    debug!("components: called");
    Ok(Json(state.engine.components().await?))
}

/// GET /diagram/:session_id
pub async fn diagram(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<DiagramResponse>, ApiError> {
    debug!(%session_id, "diagram: called");
    let session_id = SessionId::from(session_id);
    let flow_diagram = state.engine.diagram(&session_id).await?;
    Ok(Json(DiagramResponse {
        session_id,
        flow_diagram,
    }))
}
