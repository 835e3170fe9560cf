//! Session storage
//!
//! Sessions live behind the [`SessionStore`] trait so the conversation flow does not
//! care whether they are kept in process memory or in Redis. Both backends expire
//! sessions after the configured TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use crate::models::Session;
use crate::utils::errors::Result;

/// Keyed session storage
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the live session for a user, if any
    async fn load(&self, user_id: i64) -> Result<Option<Session>>;

    /// Insert or replace the user's session and refresh its TTL
    async fn save(&self, session: &Session) -> Result<()>;

    async fn delete(&self, user_id: i64) -> Result<()>;
}

#[derive(Debug, Clone)]
struct StoredSession {
    session: Session,
    expires_at: DateTime<Utc>,
}

impl StoredSession {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Process-local session store
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<i64, StoredSession>>>,
    ttl: chrono::Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Drop every session whose TTL has elapsed
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, stored| !stored.is_expired(now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, user_id: i64) -> Result<Option<Session>> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&user_id) {
                Some(stored) if !stored.is_expired(now) => return Ok(Some(stored.session.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        debug!(user_id = user_id, "Session expired, removing");
        let mut sessions = self.sessions.write().await;
        if sessions.get(&user_id).is_some_and(|stored| stored.is_expired(now)) {
            sessions.remove(&user_id);
        }
        Ok(None)
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let stored = StoredSession {
            session: session.clone(),
            expires_at: Utc::now().checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        self.sessions.write().await.insert(session.user_id(), stored);
        Ok(())
    }

    async fn delete(&self, user_id: i64) -> Result<()> {
        self.sessions.write().await.remove(&user_id);
        Ok(())
    }
}

/// Periodically purges expired in-memory sessions
#[derive(Debug)]
pub struct SessionJanitor {
    store: InMemorySessionStore,
    interval: Duration,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl SessionJanitor {
    pub fn new(store: InMemorySessionStore, interval: Duration) -> Self {
        Self {
            store,
            interval,
            handle: None,
        }
    }

    pub fn start(&mut self) {
        if self.handle.is_some() {
            warn!("Session cleanup task is already running");
            return;
        }

        let store = self.store.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = store.purge_expired().await;
                if removed > 0 {
                    info!("Session cleanup removed {} expired sessions", removed);
                }
            }
        });

        self.handle = Some(handle);
        info!("Started session cleanup task with interval {:?}", self.interval);
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Stopped session cleanup task");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for SessionJanitor {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}
