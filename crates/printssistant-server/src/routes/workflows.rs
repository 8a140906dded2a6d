//! Durable-workflow dispatch endpoint.

use axum::{Json, Router, body::Bytes, extract::State, routing::post};
use printssistant_design::{DesignError, DesignSpec, WorkflowStarted};

use crate::error::Result;
use crate::routes::designs::parse_body;
use crate::state::AppState;

/// POST /api/start-workflow
pub async fn start_workflow_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WorkflowStarted>> {
    let spec: DesignSpec = parse_body(&body)?;
    let trigger = state
        .workflows
        .as_ref()
        .ok_or(DesignError::WorkflowUnavailable)?;
    let started = trigger.start(&spec).await?;
    Ok(Json(started))
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/api/start-workflow", post(start_workflow_handler))
}
