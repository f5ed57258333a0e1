use crate::api::ApiError;
use crate::query::{QueryCache, Subscription};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Load state of one resource on screen.
///
/// `Idle → Loading → Success | Error`, `Error → Loading` on retry and
/// `Success → Loading` on filter change or invalidation.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState::Idle
    }
}

impl<T> ViewState<T> {
    pub fn begin_loading(&mut self) {
        *self = ViewState::Loading;
    }

    /// Applies a finished request. A cancelled request is dropped and leaves
    /// the state untouched; returns whether the state changed.
    pub fn resolve(&mut self, result: Result<T, ApiError>) -> bool {
        match result {
            Ok(data) => {
                *self = ViewState::Success(data);
                true
            }
            Err(err) if err.is_cancelled() => {
                debug!("discarding cancelled response");
                false
            }
            Err(err) => {
                *self = ViewState::Error(err.user_message());
                true
            }
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            ViewState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn can_retry(&self) -> bool {
        matches!(self, ViewState::Error(_))
    }
}

impl<U> ViewState<Vec<U>> {
    /// Loaded successfully with nothing to show.
    pub fn is_empty_state(&self) -> bool {
        matches!(self, ViewState::Success(items) if items.is_empty())
    }
}

/// Keys a view displays that were invalidated since it last read them.
pub struct StaleKeys {
    cache: QueryCache,
    stale: Arc<Mutex<HashSet<String>>>,
    subscriptions: Vec<Subscription>,
}

impl StaleKeys {
    pub fn new(cache: QueryCache) -> Self {
        Self {
            cache,
            stale: Arc::new(Mutex::new(HashSet::new())),
            subscriptions: vec![],
        }
    }

    /// Starts tracking `key`; watching a key twice is a no-op.
    pub fn watch(&mut self, key: &str) {
        if self.subscriptions.iter().any(|s| s.key == key) {
            return;
        }
        let stale = Arc::clone(&self.stale);
        let subscription = self.cache.subscribe(key, move |invalidated| {
            stale
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(invalidated.to_string());
        });
        self.subscriptions.push(subscription);
    }

    pub fn unwatch(&mut self, key: &str) {
        let cache = &self.cache;
        self.subscriptions.retain(|subscription| {
            if subscription.key == key {
                cache.unsubscribe(subscription);
                false
            } else {
                true
            }
        });
        self.lock().remove(key);
    }

    /// Whether `key` went stale; clears the mark.
    pub fn take(&self, key: &str) -> bool {
        self.lock().remove(key)
    }

    pub fn is_stale(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.stale.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for StaleKeys {
    fn drop(&mut self) {
        for subscription in &self.subscriptions {
            self.cache.unsubscribe(subscription);
        }
    }
}
