//! Session HTTP handlers.
//!
//! Endpoints:
//! - GET    /session/{session_id} - Snapshot of a session
//! - DELETE /session/{session_id} - Delete a session

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use infraplan_types::conversation::{Completion, CompletionStatus, ConversationMode, Progress};
use infraplan_types::session::SessionRecord;

use super::parse_session_id;
use crate::http::error::AppError;
use crate::state::AppState;

/// Read-only view of a stored session.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub status: CompletionStatus,
    pub progress: Progress,
    pub mode: ConversationMode,
    pub completion: Option<Completion>,
    /// Transcript texts, oldest first.
    pub history: Vec<String>,
    /// The latest assistant message.
    pub next_response: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionRecord> for SessionInfo {
    fn from(record: SessionRecord) -> Self {
        let state = &record.state;
        Self {
            session_id: record.id.to_string(),
            status: state.status(),
            progress: state.progress(),
            mode: state.mode(),
            completion: state.completion(),
            history: state
                .transcript()
                .turns()
                .iter()
                .map(|turn| turn.content.clone())
                .collect(),
            next_response: state.latest_message().unwrap_or_default().to_string(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// GET /session/{session_id} - Get a session snapshot.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionInfo>, AppError> {
    let id = parse_session_id(&session_id)?;
    let record = state.conversation_service.snapshot(&id).await?;
    Ok(Json(record.into()))
}

/// DELETE /session/{session_id} - Delete a session.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_session_id(&session_id)?;
    state.conversation_service.delete(&id).await?;
    Ok(Json(serde_json::json!({
        "message": "Session deleted successfully",
    })))
}
