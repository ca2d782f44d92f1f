//! Application error type mapping to HTTP status codes and the error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use infraplan_core::service::conversation::ServiceError;
use infraplan_types::error::{BoqError, ConversationError, SessionError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Conversation service failures.
    Service(ServiceError),
    /// Malformed request.
    Validation(String),
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        AppError::Service(e)
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Service(e.into())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Service(ServiceError::Session(SessionError::NotFound)) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Session not found or expired".to_string(),
            ),
            AppError::Service(ServiceError::Conversation(ConversationError::AlreadyCompleted)) => (
                StatusCode::BAD_REQUEST,
                "CONVERSATION_COMPLETED",
                "Conversation already completed.".to_string(),
            ),
            AppError::Service(ServiceError::Conversation(e @ ConversationError::MissingInput)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Service(ServiceError::Conversation(
                e @ ConversationError::ModeMismatch { .. },
            )) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", e.to_string()),
            AppError::Service(ServiceError::Boq(BoqError::NotCompleted)) => (
                StatusCode::BAD_REQUEST,
                "CONVERSATION_NOT_COMPLETED",
                "Conversation not completed. Please finish the questions first.".to_string(),
            ),
            AppError::Service(ServiceError::Boq(BoqError::EmptySummary)) => (
                StatusCode::BAD_REQUEST,
                "SUMMARY_MISSING",
                "No information summary available. Please complete conversation first."
                    .to_string(),
            ),
            AppError::Service(ServiceError::Boq(BoqError::Generation(reason))) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "BOQ_GENERATION_FAILED",
                format!("Failed to generate BOQ: {reason}"),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, "{message}");
        } else {
            tracing::debug!(code, status = status.as_u16(), "{message}");
        }

        let body = json!({
            "data": null,
            "meta": {
                "timestamp": chrono::Utc::now().to_rfc3339(),
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infraplan_types::conversation::ConversationMode;

    #[test]
    fn not_found_maps_to_404() {
        let (status, code, message) = AppError::from(SessionError::NotFound).parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "SESSION_NOT_FOUND");
        assert_eq!(message, "Session not found or expired");
    }

    #[test]
    fn boq_generation_failure_is_server_error() {
        let err = AppError::Service(ServiceError::Boq(BoqError::Generation("timeout".into())));
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "BOQ_GENERATION_FAILED");
        assert_eq!(message, "Failed to generate BOQ: timeout");
    }

    #[test]
    fn completed_conversation_is_client_error() {
        let err = AppError::Service(ServiceError::Conversation(
            ConversationError::AlreadyCompleted,
        ));
        assert_eq!(err.parts().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn driver_mode_mismatch_is_server_error() {
        let err = AppError::Service(ServiceError::Conversation(ConversationError::ModeMismatch {
            expected: ConversationMode::Programmatic,
            actual: ConversationMode::Interactive,
        }));
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
        assert_eq!(
            message,
            "interactive conversation cannot be advanced by the programmatic driver"
        );
    }
}
