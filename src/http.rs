use crate::api::ApiError;
use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::info;

/// Scratch origin used only to borrow `Url`'s percent-encoding.
static ORIGIN: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost/").expect("valid origin"));

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReqParam {
    pub key: String,
    pub value: String,
}

impl ReqParam {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        ReqParam {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A path relative to the API base URL. Its rendered form is the cache key.
#[derive(Clone, Debug, PartialEq)]
pub struct Endpoint {
    pub path: String,
    pub query_params: Vec<ReqParam>,
}

impl Endpoint {
    /// Substitutes `:name` segments with percent-encoded values.
    pub fn new(path: &str, path_params: Vec<ReqParam>) -> Endpoint {
        let segments = path.trim_start_matches('/').split('/').map(|segment| {
            path_params
                .iter()
                .find(|param| param.key == segment)
                .map_or(segment, |param| param.value.as_str())
        });
        let mut url = ORIGIN.clone();
        if let Ok(mut encoded) = url.path_segments_mut() {
            encoded.clear().extend(segments);
        }
        Endpoint {
            path: url.path().to_string(),
            query_params: vec![],
        }
    }

    pub fn with_query(mut self, key: &str, value: Option<&str>) -> Endpoint {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.query_params.push(ReqParam::new(key, value));
        }
        self
    }

    pub fn to_url(&self) -> String {
        if self.query_params.is_empty() {
            return self.path.to_string();
        }
        let mut url = ORIGIN.clone();
        url.query_pairs_mut().extend_pairs(
            self.query_params
                .iter()
                .map(|param| (param.key.as_str(), param.value.as_str())),
        );
        match url.query() {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    POST,
    GET,
    PUT,
    PATCH,
    DELETE,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::POST => "POST",
            HttpMethod::GET => "GET",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
        };
        f.write_str(name)
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "POST" => Ok(HttpMethod::POST),
            "GET" => Ok(HttpMethod::GET),
            "PUT" => Ok(HttpMethod::PUT),
            "PATCH" => Ok(HttpMethod::PATCH),
            "DELETE" => Ok(HttpMethod::DELETE),
            _ => Err(format!("Invalid HTTP method: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>, body: Option<Value>) -> HttpRequest {
        HttpRequest {
            method,
            url: url.into(),
            body,
        }
    }

    pub fn get(url: impl Into<String>) -> HttpRequest {
        Self::new(HttpMethod::GET, url, None)
    }
}

/// Raw response; status handling belongs to [`crate::api::Envelope`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// A path prefix on the base URL (`https://host/marketplace`) is kept
    /// in front of every endpoint.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|err| ApiError::Transport(format!("invalid base url: {}", err)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self { client, base_url })
    }

    fn build_reqwest(&self, request: &HttpRequest) -> Result<RequestBuilder, ApiError> {
        let url = self
            .base_url
            .join(request.url.trim_start_matches('/'))
            .map_err(|err| ApiError::Transport(format!("invalid url {}: {}", request.url, err)))?;
        let library_method = match &request.method {
            HttpMethod::POST => Method::POST,
            HttpMethod::GET => Method::GET,
            HttpMethod::PUT => Method::PUT,
            HttpMethod::PATCH => Method::PATCH,
            HttpMethod::DELETE => Method::DELETE,
        };
        let mut req = self.client.request(library_method, url);
        if let Some(body) = &request.body {
            req = req.json(body);
        }
        Ok(req)
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        info!("{} {}", request.method, request.url);
        let req = self.build_reqwest(&request)?;
        match req.send().await {
            Ok(response) => {
                let status_code = response.status().as_u16();
                info!("{} {} -> {}", request.method, request.url, status_code);
                let body = response
                    .text()
                    .await
                    .map_err(|err| ApiError::Transport(err.to_string()))?;
                Ok(HttpResponse { status_code, body })
            }
            Err(error) => {
                info!("http request failed: {}", error);
                Err(ApiError::Transport(error.to_string()))
            }
        }
    }
}
