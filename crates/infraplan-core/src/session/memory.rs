//! In-process session store.
//!
//! A `DashMap` of per-session async mutexes. The map shard guard is only held
//! long enough to clone the slot's `Arc`; never across an await.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use infraplan_types::conversation::ConversationState;
use infraplan_types::error::SessionError;
use infraplan_types::session::{SessionId, SessionRecord, is_expired};

use super::store::{SessionLease, SessionStore};

/// Default session lifetime: one hour from creation.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

struct Slot {
    /// Copied out of the record so expiry checks never need the lock.
    created_at: DateTime<Utc>,
    record: Arc<Mutex<SessionRecord>>,
}

#[derive(Clone)]
pub struct InMemorySessionStore {
    slots: Arc<DashMap<SessionId, Slot>>,
    ttl: chrono::Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Drop every session whose age exceeds the TTL.
    fn purge_expired(&self) {
        let now = Utc::now();
        let ttl = self.ttl;
        let before = self.slots.len();
        self.slots
            .retain(|_, slot| !is_expired(slot.created_at, ttl, now));
        let purged = before.saturating_sub(self.slots.len());
        if purged > 0 {
            debug!(purged, "expired sessions purged");
        }
    }

    fn slot(&self, id: &SessionId) -> Result<Arc<Mutex<SessionRecord>>, SessionError> {
        self.purge_expired();
        self.slots
            .get(id)
            .map(|slot| Arc::clone(&slot.record))
            .ok_or(SessionError::NotFound)
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

/// Lease over one in-memory session.
pub struct MemoryLease {
    guard: OwnedMutexGuard<SessionRecord>,
}

impl SessionLease for MemoryLease {
    fn record(&self) -> &SessionRecord {
        &self.guard
    }

    fn commit(&mut self, state: ConversationState) {
        self.guard.state = state;
        self.guard.updated_at = Utc::now();
    }
}

impl SessionStore for InMemorySessionStore {
    type Lease = MemoryLease;

    async fn create(&self, state: ConversationState) -> SessionRecord {
        self.purge_expired();
        let record = SessionRecord::new(SessionId::new(), state);
        self.slots.insert(
            record.id,
            Slot {
                created_at: record.created_at,
                record: Arc::new(Mutex::new(record.clone())),
            },
        );
        record
    }

    async fn get(&self, id: &SessionId) -> Result<SessionRecord, SessionError> {
        let slot = self.slot(id)?;
        let record = slot.lock().await;
        Ok(record.clone())
    }

    async fn checkout(&self, id: &SessionId) -> Result<MemoryLease, SessionError> {
        let slot = self.slot(id)?;
        Ok(MemoryLease {
            guard: slot.lock_owned().await,
        })
    }

    async fn update(
        &self,
        id: &SessionId,
        state: ConversationState,
    ) -> Result<SessionRecord, SessionError> {
        let slot = self.slot(id)?;
        let mut record = slot.lock().await;
        record.state = state;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), SessionError> {
        self.purge_expired();
        self.slots
            .remove(id)
            .map(|_| ())
            .ok_or(SessionError::NotFound)
    }

    async fn len(&self) -> usize {
        self.purge_expired();
        self.slots.len()
    }
}
