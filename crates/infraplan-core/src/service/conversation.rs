//! Conversation service: the use cases behind the HTTP API.
//!
//! Each operation checks out the session, runs one programmatic step on a
//! copy of its state, and commits the copy only if the step succeeded. The
//! lease is held across the model call, so two requests for the same session
//! are processed one after the other.

use tracing::info;

use infraplan_types::conversation::{
    Completion, CompletionStatus, ConversationMode, ConversationState, Progress,
};
use infraplan_types::error::{BoqError, ConversationError, SessionError};
use infraplan_types::session::{SessionId, SessionRecord};

use crate::boq::BoqRenderer;
use crate::conversation::driver::{ProgrammaticDriver, StepOutcome};
use crate::session::store::{SessionLease, SessionStore};

/// Errors surfaced to API callers.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Conversation(#[from] ConversationError),

    #[error(transparent)]
    Boq(#[from] BoqError),
}

/// Result of one step, as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub session_id: SessionId,
    pub message: String,
    pub status: CompletionStatus,
    pub progress: Progress,
    pub completion: Option<Completion>,
}

impl StepReport {
    fn from_state(session_id: SessionId, state: &ConversationState) -> Self {
        Self {
            session_id,
            message: state.latest_message().unwrap_or_default().trim().to_string(),
            status: state.status(),
            progress: state.progress(),
            completion: state.completion(),
        }
    }
}

pub struct ConversationService<S: SessionStore> {
    store: S,
    driver: ProgrammaticDriver,
    boq: BoqRenderer,
}

impl<S: SessionStore> ConversationService<S> {
    pub fn new(store: S, driver: ProgrammaticDriver, boq: BoqRenderer) -> Self {
        Self { store, driver, boq }
    }

    /// Create a session and run its opening turn.
    pub async fn start(&self) -> Result<StepReport, ServiceError> {
        let mut state = ConversationState::new(ConversationMode::Programmatic);
        self.driver.step(&mut state, None).await?;
        let record = self.store.create(state).await;
        info!(session_id = %record.id, "session started");
        Ok(StepReport::from_state(record.id, &record.state))
    }

    /// Append the user's message and run one step.
    pub async fn chat(&self, id: &SessionId, message: String) -> Result<StepReport, ServiceError> {
        let mut lease = self.store.checkout(id).await?;
        let mut state = lease.record().state.clone();

        let outcome = self.driver.step(&mut state, Some(message)).await?;
        if matches!(outcome, StepOutcome::Completed(_)) {
            info!(session_id = %id, "session completed");
        }

        let report = StepReport::from_state(*id, &state);
        lease.commit(state);
        Ok(report)
    }

    /// Render the BOQ for a session whose conversation produced a summary.
    ///
    /// Performs no model call unless the session is complete with a
    /// non-empty summary. Rendering failures leave the session untouched.
    pub async fn create_boq(&self, id: &SessionId) -> Result<StepReport, ServiceError> {
        let record = self.store.get(id).await?;
        let summary = match record.state.completion() {
            Some(Completion::Summary) => record.state.summary().unwrap_or_default().trim(),
            _ => return Err(BoqError::NotCompleted.into()),
        };
        if summary.is_empty() {
            return Err(BoqError::EmptySummary.into());
        }

        let boq = self.boq.render(summary).await?;
        info!(session_id = %id, "BOQ generated");
        Ok(StepReport {
            session_id: *id,
            message: boq,
            status: record.state.status(),
            progress: Progress::COMPLETE,
            completion: record.state.completion(),
        })
    }

    pub async fn snapshot(&self, id: &SessionId) -> Result<SessionRecord, ServiceError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn delete(&self, id: &SessionId) -> Result<(), ServiceError> {
        self.store.delete(id).await?;
        info!(session_id = %id, "session deleted");
        Ok(())
    }

    pub async fn active_sessions(&self) -> usize {
        self.store.len().await
    }
}
