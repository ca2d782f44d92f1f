//! Conversation HTTP handlers.
//!
//! Endpoints:
//! - POST /start                    - Create a session and ask the first question
//! - POST /chat/{session_id}        - Answer the current question
//! - POST /create_boq/{session_id}  - Render the BOQ for a completed session

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use infraplan_core::service::conversation::StepReport;
use infraplan_types::conversation::{CompletionStatus, Progress};

use super::parse_session_id;
use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for `POST /chat/{session_id}`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Response body shared by all three conversation endpoints.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub agent_message: String,
    pub status: CompletionStatus,
    pub progress: Progress,
}

impl From<StepReport> for ChatResponse {
    fn from(report: StepReport) -> Self {
        Self {
            session_id: report.session_id.to_string(),
            agent_message: report.message,
            status: report.status,
            progress: report.progress,
        }
    }
}

/// POST /start - Create a session and run the opening turn.
pub async fn start(State(state): State<AppState>) -> Result<Json<ChatResponse>, AppError> {
    let report = state.conversation_service.start().await?;
    Ok(Json(report.into()))
}

/// POST /chat/{session_id} - Append the user's answer and run one step.
pub async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let id = parse_session_id(&session_id)?;
    let Json(request) = body.map_err(|e| AppError::Validation(e.body_text()))?;

    let report = state.conversation_service.chat(&id, request.message).await?;
    Ok(Json(report.into()))
}

/// POST /create_boq/{session_id} - Render the priced BOQ from the summary table.
pub async fn create_boq(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ChatResponse>, AppError> {
    let id = parse_session_id(&session_id)?;
    let report = state.conversation_service.create_boq(&id).await?;
    Ok(Json(report.into()))
}
