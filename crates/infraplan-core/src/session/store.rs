//! Session store port.
//!
//! Uses RPITIT (return position `impl Trait` in traits) consistent with the
//! other async traits in this crate.

use std::future::Future;

use infraplan_types::conversation::ConversationState;
use infraplan_types::error::SessionError;
use infraplan_types::session::{SessionId, SessionRecord};

/// Exclusive access to one session for the duration of a state-machine step.
///
/// Other requests for the same id wait until the lease is dropped; requests
/// for different ids are unaffected.
pub trait SessionLease: Send {
    fn record(&self) -> &SessionRecord;

    /// Replace the stored state and bump `updated_at`.
    fn commit(&mut self, state: ConversationState);
}

/// Keyed, TTL-bounded storage for conversation state.
///
/// Every operation first purges sessions older than the TTL (measured from
/// `created_at`), so an expired id behaves exactly like an unknown one.
pub trait SessionStore: Send + Sync {
    type Lease: SessionLease;

    /// Store a new conversation under a fresh id.
    fn create(
        &self,
        state: ConversationState,
    ) -> impl Future<Output = SessionRecord> + Send;

    /// Snapshot of a session.
    fn get(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<SessionRecord, SessionError>> + Send;

    /// Acquire exclusive read-modify-write access to a session.
    fn checkout(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<Self::Lease, SessionError>> + Send;

    /// Replace a session's state outside of a lease.
    ///
    /// Waits for any outstanding lease on the same id.
    fn update(
        &self,
        id: &SessionId,
        state: ConversationState,
    ) -> impl Future<Output = Result<SessionRecord, SessionError>> + Send;

    fn delete(&self, id: &SessionId) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Number of live (unexpired) sessions.
    fn len(&self) -> impl Future<Output = usize> + Send;
}
