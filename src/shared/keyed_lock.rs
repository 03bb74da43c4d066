//! Usage: Per-key async locks (serialize work on one key, let distinct keys run concurrently).

use crate::shared::mutex_ext::MutexExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub(crate) struct KeyedLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

pub(crate) struct KeyedGuard<'a> {
    owner: &'a KeyedLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub(crate) async fn acquire(&self, key: &str) -> KeyedGuard<'_> {
        let slot = {
            let mut map = self.inner.lock_or_recover();
            Arc::clone(map.entry(key.to_string()).or_default())
        };
        let guard = slot.lock_owned().await;
        KeyedGuard {
            owner: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Whether work currently holds (or waits on) the lock for `key`.
    pub(crate) fn is_busy(&self, key: &str) -> bool {
        let map = self.inner.lock_or_recover();
        map.get(key).is_some_and(|slot| slot.try_lock().is_err())
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.inner.lock_or_recover().len()
    }
}

impl Drop for KeyedGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut map = self.owner.inner.lock_or_recover();
        // Only the map itself holds the slot once nobody is waiting on it.
        if map
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            map.remove(&self.key);
        }
    }
}
