//! Redis-backed session store
//!
//! Sessions are stored as JSON under `<prefix>session:<user_id>` and expire
//! through Redis TTLs, so no cleanup task is needed for this backend.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, error};
use crate::config::RedisConfig;
use crate::models::Session;
use crate::utils::errors::Result;
use super::storage::SessionStore;

#[derive(Clone)]
pub struct RedisSessionStore {
    connection_manager: redis::aio::ConnectionManager,
    prefix: String,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub async fn new(config: &RedisConfig, ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            prefix: config.prefix.clone(),
            ttl_seconds,
        })
    }

    /// Test Redis connection
    pub async fn test_connection(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn session_key(&self, user_id: i64) -> String {
        session_key(&self.prefix, user_id)
    }
}

fn session_key(prefix: &str, user_id: i64) -> String {
    format!("{}session:{}", prefix, user_id)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, user_id: i64) -> Result<Option<Session>> {
        let key = self.session_key(user_id);
        let mut conn = self.connection_manager.clone();

        let serialized: Option<String> = conn.get(&key).await.map_err(|e| {
            error!(user_id = user_id, error = %e, "Failed to get session from Redis");
            e
        })?;

        match serialized {
            Some(data) => {
                let session = serde_json::from_str::<Session>(&data).map_err(|e| {
                    error!(user_id = user_id, error = %e, "Failed to deserialize session");
                    e
                })?;
                debug!(user_id = user_id, step = %session.step(), "Session loaded from Redis");
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let key = self.session_key(session.user_id());
        let serialized = serde_json::to_string(session)?;
        let mut conn = self.connection_manager.clone();

        conn.set_ex::<_, _, ()>(&key, serialized, self.ttl_seconds).await.map_err(|e| {
            error!(user_id = session.user_id(), error = %e, "Failed to save session to Redis");
            e
        })?;

        debug!(user_id = session.user_id(), ttl_seconds = self.ttl_seconds, "Session saved to Redis");
        Ok(())
    }

    async fn delete(&self, user_id: i64) -> Result<()> {
        let key = self.session_key(user_id);
        let mut conn = self.connection_manager.clone();
        let _: u32 = conn.del(&key).await?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore")
            .field("prefix", &self.prefix)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}
