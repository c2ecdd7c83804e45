//! Per-key async locking
//!
//! Callers serialize work on a single key (a token, an identity pair, a game)
//! while work on other keys proceeds without contention.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// Registry of one async mutex per key
///
/// Slots are held weakly: once every guard and waiter for a key is gone the
/// slot is dropped and pruned on a later insertion.
#[derive(Debug)]
pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Weak<Mutex<()>>>>,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for exclusive access to `key`
    ///
    /// The registry itself is only locked while the slot is looked up, so a
    /// slow holder of one key never delays lookups for another.
    pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().await;
            match slots.get(key).and_then(|slot| slot.upgrade()) {
                Some(slot) => slot,
                None => {
                    slots.retain(|_, slot| slot.strong_count() > 0);
                    let slot = Arc::new(Mutex::new(()));
                    slots.insert(key.clone(), Arc::downgrade(&slot));
                    trace!("Created lock slot for {:?}", key);
                    slot
                }
            }
        };

        slot.lock_owned().await
    }

    /// Number of keys currently holding a live slot
    pub async fn active_keys(&self) -> usize {
        let slots = self.slots.lock().await;
        slots.values().filter(|slot| slot.strong_count() > 0).count()
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
