use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::models::UserId;

/// Idle entries are pruned once the map grows past this size
const PRUNE_THRESHOLD: usize = 1024;

/// Per-user async locks serializing recommendation writes
///
/// Runs for different users never contend. Entries nobody holds or waits on are
/// dropped opportunistically so the map stays bounded by the number of active users.
#[derive(Clone, Default)]
pub struct UserLocks {
    inner: Arc<Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other holder exists for `user_id`
    pub async fn acquire(&self, user_id: &UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            if locks.len() > PRUNE_THRESHOLD {
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            locks
                .entry(user_id.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_user_waits() {
        let locks = UserLocks::new();
        let user = UserId::from("u-1");

        let guard = locks.acquire(&user).await;
        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.acquire(&user)).await;
        assert!(blocked.is_err());

        drop(guard);
        let reacquired = tokio::time::timeout(Duration::from_millis(50), locks.acquire(&user)).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_different_users_do_not_contend() {
        let locks = UserLocks::new();
        let _first = locks.acquire(&UserId::from("u-1")).await;

        let other = tokio::time::timeout(
            Duration::from_millis(50),
            locks.acquire(&UserId::from("u-2")),
        )
        .await;
        assert!(other.is_ok());
        assert_eq!(locks.tracked(), 2);
    }

    #[tokio::test]
    async fn test_idle_entries_pruned() {
        let locks = UserLocks::new();
        for i in 0..=PRUNE_THRESHOLD {
            let _guard = locks.acquire(&UserId::new(format!("u-{}", i))).await;
        }
        assert_eq!(locks.tracked(), PRUNE_THRESHOLD + 1);

        let _held = locks.acquire(&UserId::from("fresh")).await;
        assert_eq!(locks.tracked(), 1);
    }
}
