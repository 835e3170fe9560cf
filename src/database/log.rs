//! Subscription log
//!
//! Every flow transition upserts a [`SubscriptionRecord`] keyed by attempt id and
//! moves the user's "current attempt" pointer to it. Earlier attempts stay in the log.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;
use crate::config::{DatabaseConfig, PersistenceBackend};
use crate::models::SubscriptionRecord;
use crate::utils::errors::Result;
use super::connection::{create_pool, run_migrations};
use super::json_file::JsonFileSubscriptionLog;
use super::repositories::SubscriptionRepository;

/// Durable record of subscription attempts
#[async_trait]
pub trait SubscriptionLog: Send + Sync {
    /// Insert or replace the record for `record.attempt_id` and make it the user's current attempt
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<()>;

    /// The user's current attempt
    async fn current_for_user(&self, user_id: i64) -> Result<Option<SubscriptionRecord>>;

    /// Every attempt the user has made, oldest first
    async fn history_for_user(&self, user_id: i64) -> Result<Vec<SubscriptionRecord>>;
}

/// Attempts plus current-attempt pointers, shared by the memory and file backends
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttemptIndex {
    attempts: HashMap<Uuid, SubscriptionRecord>,
    current: HashMap<i64, Uuid>,
}

impl AttemptIndex {
    pub fn upsert(&mut self, record: &SubscriptionRecord) {
        self.attempts.insert(record.attempt_id, record.clone());
        self.current.insert(record.user_id, record.attempt_id);
    }

    pub fn current_for_user(&self, user_id: i64) -> Option<SubscriptionRecord> {
        self.current.get(&user_id)
            .and_then(|attempt_id| self.attempts.get(attempt_id))
            .cloned()
    }

    pub fn history_for_user(&self, user_id: i64) -> Vec<SubscriptionRecord> {
        let mut history: Vec<_> = self.attempts.values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        history.sort_by_key(|r| r.updated_at);
        history
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

/// Process-local log, mostly for development and tests
#[derive(Debug, Default)]
pub struct MemorySubscriptionLog {
    index: RwLock<AttemptIndex>,
    writes: AtomicUsize,
}

impl MemorySubscriptionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of upserts performed so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    pub async fn attempt_count(&self) -> usize {
        self.index.read().await.len()
    }
}

#[async_trait]
impl SubscriptionLog for MemorySubscriptionLog {
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<()> {
        self.index.write().await.upsert(record);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn current_for_user(&self, user_id: i64) -> Result<Option<SubscriptionRecord>> {
        Ok(self.index.read().await.current_for_user(user_id))
    }

    async fn history_for_user(&self, user_id: i64) -> Result<Vec<SubscriptionRecord>> {
        Ok(self.index.read().await.history_for_user(user_id))
    }
}

/// Open the configured backend; `None` when persistence is disabled
pub async fn open_subscription_log(config: &DatabaseConfig) -> Result<Option<Arc<dyn SubscriptionLog>>> {
    let log: Arc<dyn SubscriptionLog> = match config.backend {
        PersistenceBackend::Disabled => {
            tracing::info!("Subscription log disabled");
            return Ok(None);
        }
        PersistenceBackend::Memory => Arc::new(MemorySubscriptionLog::new()),
        PersistenceBackend::JsonFile => Arc::new(JsonFileSubscriptionLog::open(&config.json_path).await?),
        PersistenceBackend::Postgres => {
            let pool = create_pool(config).await?;
            run_migrations(&pool).await?;
            Arc::new(SubscriptionRepository::new(pool))
        }
    };

    tracing::info!(backend = ?config.backend, "Subscription log ready");
    Ok(Some(log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentMethod, PlanDuration, ProductType, Session, SubscriptionStatus};

    fn record_for(session: &Session, status: SubscriptionStatus) -> SubscriptionRecord {
        SubscriptionRecord::from_session(session, status)
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_attempt() {
        let log = MemorySubscriptionLog::new();
        let mut session = Session::new(5, "ar");
        session.choose_product(ProductType::Group).unwrap();
        log.upsert(&record_for(&session, SubscriptionStatus::Pending)).await.unwrap();

        session.choose_duration(PlanDuration::Months(1), false).unwrap();
        session.choose_payment(PaymentMethod::Stars, 200).unwrap();
        log.upsert(&record_for(&session, SubscriptionStatus::AwaitingAmount)).await.unwrap();

        assert_eq!(log.attempt_count().await, 1);
        assert_eq!(log.write_count(), 2);

        let current = log.current_for_user(5).await.unwrap().unwrap();
        assert_eq!(current.status, SubscriptionStatus::AwaitingAmount);
        assert_eq!(current.expected_amount, Some(200));
    }

    #[tokio::test]
    async fn test_new_attempt_keeps_history() {
        let log = MemorySubscriptionLog::new();
        let first = Session::new(5, "ar");
        let second = Session::new(5, "ar");

        log.upsert(&record_for(&first, SubscriptionStatus::Pending)).await.unwrap();
        log.upsert(&record_for(&second, SubscriptionStatus::Pending)).await.unwrap();

        let current = log.current_for_user(5).await.unwrap().unwrap();
        assert_eq!(current.attempt_id, second.attempt_id());
        assert_eq!(log.history_for_user(5).await.unwrap().len(), 2);
        assert!(log.current_for_user(6).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disabled_backend() {
        let config = DatabaseConfig {
            backend: PersistenceBackend::Disabled,
            ..DatabaseConfig::default()
        };
        assert!(open_subscription_log(&config).await.unwrap().is_none());
    }
}
