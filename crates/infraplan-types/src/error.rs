use thiserror::Error;

use crate::conversation::ConversationMode;

/// Errors related to session store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Unknown id, or the session outlived its TTL.
    #[error("session not found or expired")]
    NotFound,
}

/// Errors related to advancing a conversation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("conversation already completed")]
    AlreadyCompleted,

    #[error("a user message is required to continue this conversation")]
    MissingInput,

    #[error("{actual} conversation cannot be advanced by the {expected} driver")]
    ModeMismatch {
        expected: ConversationMode,
        actual: ConversationMode,
    },
}

/// Errors related to BOQ rendering.
#[derive(Debug, Error)]
pub enum BoqError {
    #[error("conversation not completed")]
    NotCompleted,

    #[error("no information summary available")]
    EmptySummary,

    #[error("failed to generate BOQ: {0}")]
    Generation(String),
}

/// Errors loading a question bank.
#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("failed to read question bank: {0}")]
    Io(String),

    #[error("failed to parse question bank: {0}")]
    Parse(String),

    #[error("question bank is empty")]
    Empty,
}

/// Errors building a runtime component from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("no endpoint configured for {0}; set llm.base_url or AZURE_OPENAI_ENDPOINT")]
    MissingEndpoint(String),
}
