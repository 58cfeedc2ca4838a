// src/services/session_manager.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;
use uuid::Uuid;

use super::session_context::SessionContext;

#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub context: SessionContext,
    pub turns: u64,
    pub opened_at: Instant,
    pub last_active: Instant,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            id: id.into(),
            context: SessionContext::default(),
            turns: 0,
            opened_at: now,
            last_active: now,
        }
    }

    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }
}

/// Live realtime sessions, one entry per open connection.
#[derive(Clone, Default)]
pub struct SessionManager {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    // Register a fresh session with the default context and return its id.
    pub async fn open_session(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let session = Session::new(id.clone());

        let mut guard = self.inner.write().await;
        guard.insert(id.clone(), session);
        id
    }

    /// Replace the session's topic. Returns false if the session is gone.
    pub async fn set_topic(&self, session_id: &str, topic: &str) -> bool {
        let mut guard = self.inner.write().await;
        match guard.get_mut(session_id) {
            Some(session) => {
                session.context.set_topic(topic);
                session.last_active = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Current system instruction for the session.
    pub async fn context(&self, session_id: &str) -> Option<String> {
        let guard = self.inner.read().await;
        guard
            .get(session_id)
            .map(|s| s.context.instruction().to_string())
    }

    /// Count a turn against the session and touch last_active.
    pub async fn record_turn(&self, session_id: &str) -> Option<u64> {
        let mut guard = self.inner.write().await;
        let session = guard.get_mut(session_id)?;
        session.turns += 1;
        session.last_active = Instant::now();
        Some(session.turns)
    }

    pub async fn get_session(&self, session_id: &str) -> Option<Session> {
        let guard = self.inner.read().await;
        guard.get(session_id).cloned()
    }

    /// Drop a session and its context.
    pub async fn close_session(&self, session_id: &str) -> bool {
        let mut guard = self.inner.write().await;
        guard.remove(session_id).is_some()
    }

    /// Number of sessions
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }
}
