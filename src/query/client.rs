use crate::api::{decode, ApiError, Envelope};
use crate::http::{HttpMethod, HttpRequest, Transport};
use crate::query::cache::QueryCache;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Fetch/mutate facade shared by every view model.
#[derive(Clone)]
pub struct QueryClient {
    transport: Arc<dyn Transport>,
    cache: QueryCache,
}

impl QueryClient {
    pub fn new(transport: Arc<dyn Transport>, cache: QueryCache) -> Self {
        Self { transport, cache }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Cached read of `url`, envelope already opened.
    pub async fn fetch_json(&self, url: &str) -> Result<Value, ApiError> {
        let transport = Arc::clone(&self.transport);
        let request = HttpRequest::get(url);
        let envelope = Envelope::for_path(url);
        self.cache
            .get_or_fetch(url, move || {
                async move {
                    let response = transport.send(request).await?;
                    envelope.open(response)
                }
                .boxed()
            })
            .await
    }

    pub async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<T, ApiError> {
        let value = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("dropping read of {} after cancellation", url);
                return Err(ApiError::Cancelled);
            }
            value = self.fetch_json(url) => value?,
        };
        decode(value)
    }

    /// Bypasses any settled value for `url`.
    pub async fn refetch<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<T, ApiError> {
        self.cache.invalidate(|key| key == url);
        self.fetch(url, token).await
    }

    /// Sends a write and, once it succeeds, invalidates every cached key
    /// under `invalidates`. The write runs to completion even when `token`
    /// is cancelled; only the caller stops waiting for it.
    pub async fn mutate<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<Value>,
        invalidates: &[&str],
        token: &CancellationToken,
    ) -> Result<T, ApiError> {
        let transport = Arc::clone(&self.transport);
        let cache = self.cache.clone();
        let request = HttpRequest::new(method, url, body);
        let envelope = Envelope::for_path(url);
        let prefixes: Vec<String> = invalidates.iter().map(|p| p.to_string()).collect();
        info!("{} {}", method, url);
        let handle = tokio::spawn(async move {
            let response = transport.send(request).await?;
            let value = envelope.open(response)?;
            for prefix in &prefixes {
                cache.invalidate_prefix(prefix);
            }
            Ok::<Value, ApiError>(value)
        });
        let value = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("caller of {} {} went away", method, url);
                return Err(ApiError::Cancelled);
            }
            joined = handle => joined.map_err(|err| ApiError::Transport(err.to_string()))??,
        };
        decode(value)
    }
}
