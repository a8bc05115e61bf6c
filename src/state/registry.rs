use std::{sync::Arc, time::Duration};

use dashmap::{DashMap, mapref::entry::Entry};
use rand::Rng;
use tracing::info;

use crate::{
    error::ServiceError,
    services::question_bank::select_subset,
    state::{
        game::Question,
        session::{Session, SessionId},
    },
};

/// Store of every live session keyed by its identifier.
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<Session>>,
    idle_timeout: Option<Duration>,
}

impl SessionRegistry {
    /// Build an empty registry. Without `idle_timeout` sessions live until the process exits.
    pub fn new(idle_timeout: Option<Duration>) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
        }
    }

    /// Create a session with `count` questions drawn from `pool`.
    ///
    /// `count` is clamped to the pool size; a non-positive count is rejected.
    pub fn create_session(&self, pool: &[Question], count: i64) -> Result<SessionId, ServiceError> {
        self.create_session_with_rng(pool, count, &mut rand::rng())
    }

    /// Same as [`SessionRegistry::create_session`] with a caller-provided question shuffle source.
    pub fn create_session_with_rng<R>(
        &self,
        pool: &[Question],
        count: i64,
        rng: &mut R,
    ) -> Result<SessionId, ServiceError>
    where
        R: Rng + ?Sized,
    {
        let count = usize::try_from(count)
            .ok()
            .filter(|count| *count > 0)
            .ok_or_else(|| {
                ServiceError::InvalidArgument(format!(
                    "question count must be positive (got {count})"
                ))
            })?;

        let questions = select_subset(pool, count, rng);
        loop {
            let id = generate_session_id();
            if let Entry::Vacant(slot) = self.sessions.entry(id.clone()) {
                info!(session_id = %id, questions = questions.len(), "session created");
                slot.insert(Arc::new(Session::new(id.clone(), questions)));
                return Ok(id);
            }
        }
    }

    /// Look up a live session. Idle sessions past the timeout are dropped and reported absent.
    pub fn get_session(&self, id: &str) -> Option<Arc<Session>> {
        let session = self.sessions.get(id).map(|entry| Arc::clone(entry.value()))?;
        if self.is_expired(&session) {
            self.expire(id);
            return None;
        }
        Some(session)
    }

    /// Like [`SessionRegistry::get_session`] but with a not-found error.
    pub fn require_session(&self, id: &str) -> Result<Arc<Session>, ServiceError> {
        self.get_session(id)
            .ok_or_else(|| ServiceError::NotFound(format!("session `{id}` not found")))
    }

    /// Number of sessions held, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is held.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Configured inactivity limit, if any.
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    /// Remove and close every expired session, returning their identifiers.
    pub fn sweep_expired(&self) -> Vec<SessionId> {
        let Some(limit) = self.idle_timeout else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        self.sessions.retain(|id, session| {
            if session.idle_for() >= limit {
                session.close();
                removed.push(id.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    fn is_expired(&self, session: &Session) -> bool {
        self.idle_timeout
            .is_some_and(|limit| session.idle_for() >= limit)
    }

    fn expire(&self, id: &str) {
        let removed = self
            .sessions
            .remove_if(id, |_, session| self.is_expired(session));
        if let Some((id, session)) = removed {
            session.close();
            info!(session_id = %id, "session expired");
        }
    }
}

/// 128 random bits from the thread-local CSPRNG, hex encoded.
fn generate_session_id() -> SessionId {
    let bits: u128 = rand::rng().random();
    format!("{bits:032x}")
}
