use crate::forms::FieldErrors;
use crate::http::HttpResponse;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub const GENERIC_LOAD_ERROR: &str = "Unable to load. Please try again.";
pub const GENERIC_REQUEST_ERROR: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request rejected: {message}")]
    Rejected { message: String },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("request cancelled")]
    Cancelled,
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
}

impl ApiError {
    /// Message a view shows next to its retry affordance.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) | ApiError::Decode(_) | ApiError::Cancelled => {
                GENERIC_LOAD_ERROR.to_string()
            }
            ApiError::Status { message, .. } | ApiError::Rejected { message } => message.clone(),
            ApiError::Validation(errors) => errors.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.trim().is_empty())
    }
}

/// Success conventions differ per endpoint family and are kept as the
/// server sends them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `{ "success": bool, "data": ..., "message"? }` under `/api/v1/`.
    Success,
    /// `{ "ok": bool, ...payload, "error"? }` under `/api/staging/`.
    Ok,
    /// Plain JSON, the HTTP status alone decides.
    Bare,
}

impl Envelope {
    pub fn for_path(path: &str) -> Self {
        if path.starts_with("/api/v1/") {
            Envelope::Success
        } else if path.starts_with("/api/staging/") {
            Envelope::Ok
        } else {
            Envelope::Bare
        }
    }

    pub fn open(&self, response: HttpResponse) -> Result<Value, ApiError> {
        if !(200..300).contains(&response.status_code) {
            return Err(status_error(response.status_code, &response.body));
        }
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        let value = serde_json::from_str::<Value>(&response.body)
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        self.strip(value)
    }

    /// Removes the family's wrapper, turning an explicit failure flag into
    /// [`ApiError::Rejected`].
    pub fn strip(&self, value: Value) -> Result<Value, ApiError> {
        match self {
            Envelope::Bare => Ok(value),
            Envelope::Success => {
                let Value::Object(mut map) = value else {
                    return Err(ApiError::Decode("expected a success envelope".to_string()));
                };
                match map.remove("success") {
                    Some(Value::Bool(true)) => Ok(map.remove("data").unwrap_or(Value::Null)),
                    Some(Value::Bool(false)) => Err(rejected(map.remove("message"))),
                    _ => Err(ApiError::Decode("envelope is missing `success`".to_string())),
                }
            }
            Envelope::Ok => {
                let Value::Object(mut map) = value else {
                    return Err(ApiError::Decode("expected an ok envelope".to_string()));
                };
                match map.remove("ok") {
                    Some(Value::Bool(true)) => Ok(Value::Object(map)),
                    Some(Value::Bool(false)) => {
                        Err(rejected(map.remove("error").or_else(|| map.remove("message"))))
                    }
                    _ => Err(ApiError::Decode("envelope is missing `ok`".to_string())),
                }
            }
        }
    }
}

fn rejected(message: Option<Value>) -> ApiError {
    let message = match message {
        Some(Value::String(message)) if !message.trim().is_empty() => message,
        _ => GENERIC_REQUEST_ERROR.to_string(),
    };
    ApiError::Rejected { message }
}

/// Best-effort extraction of `{message}` from a non-2xx body.
pub fn status_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| GENERIC_REQUEST_ERROR.to_string());
    warn!("request failed, status: {}, message: {}", status, message);
    ApiError::Status { status, message }
}

pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
}
