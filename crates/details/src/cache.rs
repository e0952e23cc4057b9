//! Keyed cache that also coalesces concurrent lookups.
//!
//! The first caller for a key runs the lookup; callers arriving while it is
//! in flight subscribe to its result instead of starting their own. Only
//! successes are stored. Entries are never evicted.

use std::{
    collections::HashMap,
    future::Future,
    hash::Hash,
    sync::{Mutex, MutexGuard, PoisonError},
};

use tokio::sync::broadcast;

use crate::{DetailError, DetailResult};

struct State<K, V> {
    entries: HashMap<K, V>,
    in_flight: HashMap<K, broadcast::Sender<DetailResult<V>>>,
}

pub struct DetailCache<K, V> {
    state: Mutex<State<K, V>>,
}

enum Registration<V> {
    Hit(V),
    Waiting(broadcast::Receiver<DetailResult<V>>),
    Leader(broadcast::Sender<DetailResult<V>>),
}

impl<K, V> DetailCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<K, V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight.len()
    }

    /// Returns the cached value for `key`, joins a lookup already running
    /// for it, or runs `fetch`.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> DetailResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DetailResult<V>>,
    {
        let registration = {
            let mut state = self.lock();
            if let Some(value) = state.entries.get(&key) {
                Registration::Hit(value.clone())
            } else if let Some(sender) = state.in_flight.get(&key) {
                Registration::Waiting(sender.subscribe())
            } else {
                let (sender, _) = broadcast::channel(1);
                state.in_flight.insert(key.clone(), sender.clone());
                Registration::Leader(sender)
            }
        };

        match registration {
            Registration::Hit(value) => Ok(value),
            Registration::Waiting(mut receiver) => receiver.recv().await.map_err(|_| {
                DetailError::Other("concurrent lookup was abandoned".to_owned())
            })?,
            Registration::Leader(sender) => {
                let mut guard = InFlight {
                    cache: self,
                    key: Some(key),
                };
                let result = fetch().await;
                if let Some(key) = guard.key.take() {
                    let mut state = self.lock();
                    state.in_flight.remove(&key);
                    if let Ok(value) = &result {
                        state.entries.insert(key, value.clone());
                    }
                }
                // nobody may be waiting
                let _ = sender.send(result.clone());
                result
            }
        }
    }
}

impl<K, V> Default for DetailCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Unregisters the key if the leading lookup is dropped before it
/// finishes, which closes the channel its waiters are subscribed to.
struct InFlight<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    cache: &'a DetailCache<K, V>,
    key: Option<K>,
}

impl<K, V> Drop for InFlight<'_, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.cache.lock().in_flight.remove(&key);
        }
    }
}
