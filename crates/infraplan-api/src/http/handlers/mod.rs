//! HTTP request handlers for the REST API.

pub mod conversation;
pub mod session;

use infraplan_types::error::SessionError;
use infraplan_types::session::SessionId;

use crate::http::error::AppError;

/// Parse a session id from a path parameter.
///
/// A malformed id cannot name a live session, so it resolves to the same
/// 404 as an unknown or expired one.
fn parse_session_id(raw: &str) -> Result<SessionId, AppError> {
    raw.parse::<SessionId>()
        .map_err(|_| AppError::from(SessionError::NotFound))
}
