//! JSON file subscription log
//!
//! The whole log is rewritten on every upsert via a temp file and rename, which keeps
//! the file readable if the process dies mid-write.
//!
//! Attempts are never pruned, so the file and each rewrite grow with the number of
//! attempts ever made. Use the postgres backend for long-running deployments.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};
use crate::models::SubscriptionRecord;
use crate::utils::errors::Result;
use super::log::{AttemptIndex, SubscriptionLog};

#[derive(Debug)]
pub struct JsonFileSubscriptionLog {
    path: PathBuf,
    index: Mutex<AttemptIndex>,
}

impl JsonFileSubscriptionLog {
    /// Load the log at `path`, starting empty when the file does not exist yet
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let index = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => AttemptIndex::default(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AttemptIndex::default(),
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), attempts = index.len(), "Loaded subscription log");
        Ok(Self {
            path,
            index: Mutex::new(index),
        })
    }

    async fn flush(&self, index: &AttemptIndex) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_vec_pretty(index)?;
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        debug!(path = %self.path.display(), "Subscription log flushed");
        Ok(())
    }
}

#[async_trait]
impl SubscriptionLog for JsonFileSubscriptionLog {
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<()> {
        let mut index = self.index.lock().await;
        let mut updated = index.clone();
        updated.upsert(record);
        self.flush(&updated).await?;
        *index = updated;
        Ok(())
    }

    async fn current_for_user(&self, user_id: i64) -> Result<Option<SubscriptionRecord>> {
        Ok(self.index.lock().await.current_for_user(user_id))
    }

    async fn history_for_user(&self, user_id: i64) -> Result<Vec<SubscriptionRecord>> {
        Ok(self.index.lock().await.history_for_user(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductType, Session, SubscriptionStatus};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("subscriptions.json");

        let mut session = Session::new(77, "ar");
        session.choose_product(ProductType::Live).unwrap();

        {
            let log = JsonFileSubscriptionLog::open(&path).await.unwrap();
            let record = SubscriptionRecord::from_session(&session, SubscriptionStatus::Pending);
            log.upsert(&record).await.unwrap();
        }

        let reopened = JsonFileSubscriptionLog::open(&path).await.unwrap();
        let current = reopened.current_for_user(77).await.unwrap().unwrap();
        assert_eq!(current.attempt_id, session.attempt_id());
        assert_eq!(current.product_type, Some(ProductType::Live));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subscriptions.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        assert!(JsonFileSubscriptionLog::open(&path).await.is_err());
    }
}
