//! Per-key async locks.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Slots = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// One async mutex per string key, created on first use and removed once
/// nobody holds or waits for it.
///
/// A caller that needs several keys must take them in a single
/// [`KeyedLocks::acquire`] call; keys are locked in sorted order so two
/// callers can never wait on each other.
#[derive(Debug, Default)]
pub(crate) struct KeyedLocks {
    slots: Slots,
}

/// Guards held for the duration of one operation.
#[derive(Debug)]
pub(crate) struct LockSet {
    slots: Slots,
    held: Vec<(String, OwnedMutexGuard<()>)>,
}

impl KeyedLocks {
    /// Waits until every key is held.
    pub(crate) async fn acquire<I>(&self, keys: I) -> LockSet
    where
        I: IntoIterator<Item = String>,
    {
        let mut keys: Vec<String> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();

        let mut set = LockSet {
            slots: Arc::clone(&self.slots),
            held: Vec::with_capacity(keys.len()),
        };
        for key in keys {
            let slot = Arc::clone(&self.slots.entry(key.clone()).or_default());
            set.held.push((key, slot.lock_owned().await));
        }
        set
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.len()
    }
}

impl Drop for LockSet {
    fn drop(&mut self) {
        for (key, guard) in self.held.drain(..) {
            drop(guard);
            // Only the map's reference left means nobody holds or waits.
            self.slots.remove_if(&key, |_, slot| Arc::strong_count(slot) == 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = Arc::new(KeyedLocks::default());
        let inside = Arc::new(AtomicU32::new(0));
        let peak = Arc::new(AtomicU32::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let peak = Arc::clone(&peak);
                tokio::spawn(async move {
                    let _held = locks.acquire(["stock:a".to_string()]).await;
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn overlapping_sets_in_any_order_do_not_deadlock() {
        let locks = Arc::new(KeyedLocks::default());
        let forward = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                for _ in 0..50 {
                    let _held = locks.acquire(["a".to_string(), "b".to_string()]).await;
                    tokio::task::yield_now().await;
                }
            })
        };
        let backward = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                for _ in 0..50 {
                    let _held = locks.acquire(["b".to_string(), "a".to_string()]).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        tokio::time::timeout(Duration::from_secs(5), async {
            forward.await.unwrap();
            backward.await.unwrap();
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn duplicate_keys_are_taken_once() {
        let locks = KeyedLocks::default();
        let held = tokio::time::timeout(
            Duration::from_secs(1),
            locks.acquire(["x".to_string(), "x".to_string()]),
        )
        .await;
        assert!(held.is_ok());
    }

    #[tokio::test]
    async fn released_keys_are_forgotten() {
        let locks = KeyedLocks::default();
        {
            let _held = locks.acquire(["a".to_string(), "b".to_string()]).await;
            assert_eq!(locks.len(), 2);
        }
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn key_with_a_waiter_is_kept_until_the_waiter_is_done() {
        let locks = Arc::new(KeyedLocks::default());
        let first = locks.acquire(["a".to_string()]).await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _held = locks.acquire(["a".to_string()]).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(first);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert_eq!(locks.len(), 0);
    }
}
