//! Transient per-user session state.
//!
//! The registry owns the only in-process mutable state of the service:
//! pending quit confirmations and pending answers. Entries are created
//! lazily, live behind a per-user async mutex, and are dropped when the
//! user is deleted. None of this is durable; a restart loses at most one
//! in-flight interaction per user.
//!
//! Holding a user's lock across an operation's store and judge round-trips
//! is what serializes concurrent requests for that user. Requests for
//! different users never share a lock; the outer map mutex is held only
//! for the lookup itself.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;

/// Which question a pending answer refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionRef {
    /// The course's mid-course question. Not scored.
    Mid,
    /// A test question, by its global test step id. Scored.
    Test(i32),
}

/// Marker that the user's next free-text message should be judged against
/// a specific reference answer. Consumed at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAnswer {
    pub question: QuestionRef,
    pub course_id: i32,
}

/// In-flight interaction state for one user.
#[derive(Debug, Default)]
pub struct UserSession {
    /// Set between a quit request and its yes/no confirmation.
    pub pending_quit: bool,
    pub pending_answer: Option<PendingAnswer>,
}

impl UserSession {
    /// Drops whatever interaction was in flight. Every operation that
    /// changes the enrollment or deletes the user calls this first, so no
    /// stale question reference survives the change.
    pub fn clear(&mut self) {
        self.pending_quit = false;
        self.pending_answer = None;
    }
}

/// Lazily-populated map from user id to that user's session handle.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<i64, Arc<AsyncMutex<UserSession>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the per-user session handle, creating an empty one on first
    /// use. Locking the returned mutex is the per-user serialization
    /// domain for the caller's whole operation.
    pub fn acquire(&self, user_id: i64) -> Arc<AsyncMutex<UserSession>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.entry(user_id).or_default().clone()
    }

    /// Removes a user's entry after the durable record is gone. A guard
    /// still held on the evicted entry stays valid; later operations get a
    /// fresh, empty entry.
    pub fn evict(&self, user_id: i64) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_returns_the_same_handle_per_user() {
        let registry = SessionRegistry::new();
        let first = registry.acquire(1);
        first.lock().await.pending_quit = true;

        let second = registry.acquire(1);
        assert!(second.lock().await.pending_quit);
    }

    #[tokio::test]
    async fn users_are_locked_independently() {
        let registry = SessionRegistry::new();
        let one = registry.acquire(1);
        let _guard = one.lock().await;

        // A different user's lock is free while user 1 is held.
        let two = registry.acquire(2);
        assert!(two.try_lock().is_ok());
    }

    #[tokio::test]
    async fn evicted_users_start_over_empty() {
        let registry = SessionRegistry::new();
        registry.acquire(1).lock().await.pending_quit = true;
        registry.evict(1);

        let session = registry.acquire(1);
        let session = session.lock().await;
        assert!(!session.pending_quit);
        assert!(session.pending_answer.is_none());
    }

    #[tokio::test]
    async fn clear_resets_both_markers() {
        let mut session = UserSession {
            pending_quit: true,
            pending_answer: Some(PendingAnswer {
                question: QuestionRef::Test(9),
                course_id: 1,
            }),
        };
        session.clear();
        assert!(!session.pending_quit);
        assert!(session.pending_answer.is_none());
    }
}
