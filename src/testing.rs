//! Scripted transport for view-model tests.

use crate::api::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::query::{QueryCache, QueryClient};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<(HttpMethod, String), VecDeque<(u16, Value)>>>,
    requests: Mutex<Vec<HttpRequest>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    failures: Mutex<HashMap<String, String>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn client(self: &Arc<Self>) -> QueryClient {
        QueryClient::new(self.clone(), QueryCache::new())
    }

    /// Queues a reply. The last queued reply for a route is repeated.
    pub fn reply(&self, method: HttpMethod, url: &str, status: u16, body: Value) {
        self.replies
            .lock()
            .unwrap()
            .entry((method, url.to_string()))
            .or_default()
            .push_back((status, body));
    }

    /// Requests to `url` wait until [`ScriptedTransport::release`].
    pub fn hold(&self, url: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(url.to_string(), Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, url: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(url) {
            gate.add_permits(1);
        }
    }

    /// Requests to `url` fail before reaching the server.
    pub fn fail(&self, url: &str, reason: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(url.to_string(), reason.to_string());
    }

    pub fn heal(&self, url: &str) {
        self.failures.lock().unwrap().remove(url);
    }

    pub fn count(&self, method: HttpMethod, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.method == method && request.url == url)
            .count()
    }

    pub fn total(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self, method: HttpMethod, url: &str) -> (u16, Value) {
        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(&(method, url.to_string())) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => (404, json!({"message": format!("no route for {} {}", method, url)})),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        let gate = self.gates.lock().unwrap().get(&request.url).cloned();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await.unwrap();
        }
        if let Some(reason) = self.failures.lock().unwrap().get(&request.url) {
            return Err(ApiError::Transport(reason.clone()));
        }
        let (status_code, body) = self.next_reply(request.method, &request.url);
        Ok(HttpResponse {
            status_code,
            body: body.to_string(),
        })
    }
}
