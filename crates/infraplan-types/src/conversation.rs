//! Conversation state for a requirements-gathering session.
//!
//! A [`ConversationState`] owns the append-only [`Transcript`], the completion
//! status and progress reported by the model, and the [`ConversationMode`]
//! fixed at creation. Fields are private so the transcript can only grow and
//! the status can only move from `not_done` to `done`. Once the conversation
//! is terminal every mutator fails with [`ConversationError::AlreadyCompleted`].

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConversationError;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Ordered, append-only history of turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<Turn>);

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.0.push(Turn {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.0.push(Turn {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Most recent assistant turn, if any.
    pub fn last_assistant(&self) -> Option<&Turn> {
        self.0.iter().rev().find(|t| t.role == Role::Assistant)
    }
}

/// Whether the model considers every question answered.
///
/// The model is asked for `not_done`, but the spelling `not done` is
/// accepted on decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CompletionStatus {
    #[default]
    #[serde(rename = "not_done", alias = "not done")]
    NotDone,
    #[serde(rename = "done")]
    Done,
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionStatus::NotDone => write!(f, "not_done"),
            CompletionStatus::Done => write!(f, "done"),
        }
    }
}

/// Completion percentage in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progress(u8);

impl Progress {
    pub const ZERO: Progress = Progress(0);
    pub const COMPLETE: Progress = Progress(100);

    /// Clamp an arbitrary model-reported number into range.
    pub fn clamped(raw: i64) -> Self {
        Progress(raw.clamp(0, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_complete(self) -> bool {
        self.0 == 100
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Control-flow strategy chosen when the conversation is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    /// Terminal loop: input is collected inline until the conversation ends.
    Interactive,
    /// HTTP: one caller request advances the conversation by one step.
    Programmatic,
}

impl fmt::Display for ConversationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationMode::Interactive => write!(f, "interactive"),
            ConversationMode::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// How a conversation reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// The model declared `done`; the last assistant turn is the summary table.
    Summary,
    /// The interactive input source closed before the model finished.
    Aborted,
}

/// Full state of one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    transcript: Transcript,
    status: CompletionStatus,
    progress: Progress,
    mode: ConversationMode,
    completion: Option<Completion>,
}

impl ConversationState {
    pub fn new(mode: ConversationMode) -> Self {
        Self {
            transcript: Transcript::new(),
            status: CompletionStatus::NotDone,
            progress: Progress::ZERO,
            mode,
            completion: None,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn status(&self) -> CompletionStatus {
        self.status
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn mode(&self) -> ConversationMode {
        self.mode
    }

    pub fn completion(&self) -> Option<Completion> {
        self.completion
    }

    /// No further turns may be appended.
    pub fn is_terminal(&self) -> bool {
        self.completion.is_some()
    }

    /// The final summary table, present only when the model declared `done`.
    pub fn summary(&self) -> Option<&str> {
        match self.completion {
            Some(Completion::Summary) => self
                .transcript
                .last_assistant()
                .map(|turn| turn.content.as_str()),
            _ => None,
        }
    }

    /// Text of the most recent assistant turn (what the caller was last shown).
    pub fn latest_message(&self) -> Option<&str> {
        self.transcript
            .last_assistant()
            .map(|turn| turn.content.as_str())
    }

    fn ensure_live(&self) -> Result<(), ConversationError> {
        if self.is_terminal() {
            return Err(ConversationError::AlreadyCompleted);
        }
        Ok(())
    }

    pub fn push_user_turn(&mut self, content: impl Into<String>) -> Result<(), ConversationError> {
        self.ensure_live()?;
        self.transcript.push_user(content);
        Ok(())
    }

    /// Append an assistant turn along with the status and progress it carried.
    ///
    /// Progress is normalised so that it reads 100 exactly when the status is
    /// `done`. A `done` turn moves the conversation to [`Completion::Summary`].
    pub fn record_assistant_turn(
        &mut self,
        status: CompletionStatus,
        progress: Progress,
        content: impl Into<String>,
    ) -> Result<(), ConversationError> {
        self.ensure_live()?;
        self.transcript.push_assistant(content);
        self.status = status;
        match status {
            CompletionStatus::Done => {
                self.progress = Progress::COMPLETE;
                self.completion = Some(Completion::Summary);
            }
            CompletionStatus::NotDone => {
                self.progress = Progress(progress.value().min(99));
            }
        }
        Ok(())
    }

    /// Mark the conversation as abandoned by the interactive user.
    ///
    /// Status and progress are left untouched; only the completion changes.
    pub fn abort(&mut self) {
        if self.completion.is_none() {
            self.completion = Some(Completion::Aborted);
        }
    }
}
