use crate::api::ApiError;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

pub type FetchFuture = BoxFuture<'static, Result<Value, ApiError>>;
type SharedFetch = Shared<FetchFuture>;

pub type Callback = Arc<dyn Fn(&str) + Send + Sync>;

enum Entry {
    /// `generation` tells a finished fetch whether its entry was invalidated
    /// and replaced while it was in flight.
    Pending { generation: u64, fetch: SharedFetch },
    Ready(Value),
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Entry>,
    subscribers: HashMap<String, Vec<(Uuid, Callback)>>,
    generation: u64,
}

/// Read-through cache keyed by request URL.
///
/// Concurrent reads of one key share a single in-flight fetch. Errors are
/// handed to every waiting caller but never stored, so the next read
/// retries. Cloning the cache shares its state.
#[derive(Clone, Default)]
pub struct QueryCache {
    state: Arc<Mutex<CacheState>>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("QueryCache")
            .field("entries", &state.entries.len())
            .field("subscribed_keys", &state.subscribers.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub key: String,
    id: Uuid,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Settled value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.lock().entries.get(key) {
            Some(Entry::Ready(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub async fn get_or_fetch<F>(&self, key: &str, fetch: F) -> Result<Value, ApiError>
    where
        F: FnOnce() -> FetchFuture,
    {
        let (generation, shared) = {
            let mut state = self.lock();
            match state.entries.get(key) {
                Some(Entry::Ready(value)) => {
                    debug!("cache hit: {}", key);
                    return Ok(value.clone());
                }
                Some(Entry::Pending { generation, fetch }) => {
                    debug!("joining in-flight fetch: {}", key);
                    (*generation, fetch.clone())
                }
                None => {
                    state.generation += 1;
                    let generation = state.generation;
                    let shared = fetch().shared();
                    state.entries.insert(
                        key.to_string(),
                        Entry::Pending {
                            generation,
                            fetch: shared.clone(),
                        },
                    );
                    (generation, shared)
                }
            }
        };

        let result = shared.await;

        let mut state = self.lock();
        let still_current = matches!(
            state.entries.get(key),
            Some(Entry::Pending { generation: current, .. }) if *current == generation
        );
        if still_current {
            match &result {
                Ok(value) => {
                    state
                        .entries
                        .insert(key.to_string(), Entry::Ready(value.clone()));
                }
                Err(_) => {
                    state.entries.remove(key);
                }
            }
        }
        result
    }

    /// Drops every entry whose key matches, settled or in flight, and
    /// notifies subscribers of matching keys. Returns the keys notified.
    pub fn invalidate<P>(&self, predicate: P) -> Vec<String>
    where
        P: Fn(&str) -> bool,
    {
        let (keys, callbacks) = {
            let mut state = self.lock();
            let mut keys: Vec<String> = state
                .entries
                .keys()
                .filter(|key| predicate(key))
                .cloned()
                .collect();
            for key in &keys {
                state.entries.remove(key);
            }
            for key in state.subscribers.keys() {
                if predicate(key) && !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
            let callbacks: Vec<(String, Callback)> = keys
                .iter()
                .flat_map(|key| {
                    state
                        .subscribers
                        .get(key)
                        .into_iter()
                        .flatten()
                        .map(move |(_, callback)| (key.clone(), Arc::clone(callback)))
                })
                .collect();
            (keys, callbacks)
        };
        debug!("invalidated {} cache keys", keys.len());
        for (key, callback) in callbacks {
            callback(&key);
        }
        keys
    }

    pub fn invalidate_prefix(&self, prefix: &str) -> Vec<String> {
        self.invalidate(|key| key.starts_with(prefix))
    }

    pub fn subscribe<C>(&self, key: &str, callback: C) -> Subscription
    where
        C: Fn(&str) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.lock()
            .subscribers
            .entry(key.to_string())
            .or_default()
            .push((id, Arc::new(callback)));
        Subscription {
            key: key.to_string(),
            id,
        }
    }

    pub fn unsubscribe(&self, subscription: &Subscription) {
        let mut state = self.lock();
        if let Some(callbacks) = state.subscribers.get_mut(&subscription.key) {
            callbacks.retain(|(id, _)| *id != subscription.id);
            if callbacks.is_empty() {
                state.subscribers.remove(&subscription.key);
            }
        }
    }
}
