//! Per-user serialization
//!
//! Events from the same user are handled one at a time; different users never
//! wait on each other.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Idle locks are pruned once the table grows past this size
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Default)]
pub struct UserLocks {
    locks: Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`; released when the guard drops
    pub async fn acquire(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.len() > PRUNE_THRESHOLD {
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(locks.entry(user_id).or_default())
        };
        lock.lock_owned().await
    }

    pub async fn tracked_users(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_user_is_serialized() {
        let locks = UserLocks::new();
        let guard = locks.acquire(1).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(1).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_different_users_do_not_contend() {
        let locks = UserLocks::new();
        let _first = locks.acquire(1).await;
        let second = tokio::time::timeout(Duration::from_millis(100), locks.acquire(2)).await;
        assert!(second.is_ok());
        assert_eq!(locks.tracked_users().await, 2);
    }
}
