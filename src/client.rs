//! Client API gateway
//!
//! The caller-side half of the wire contract: serializes `{action, ...}`
//! requests, retries transient failures (lock contention, infrastructure
//! faults, transport errors) with exponential backoff plus jitter, and
//! returns terminal rejections immediately. Whether a failure is retryable
//! is read from the `code` field of the error envelope.

use std::time::Duration;

use rand::Rng;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Retry budget and backoff shape for transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, first try included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_jitter_ms: 200,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// A structured error envelope: a terminal rejection, or a transient
    /// failure that survived the whole retry budget.
    #[error("{message}")]
    Api { code: String, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ClientError {
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

enum Outcome {
    Success(Value),
    Failure { code: String, message: String },
}

/// Codes worth retrying. Everything else was evaluated and rejected for a
/// business reason; retrying cannot change the answer.
fn is_transient(code: &str) -> bool {
    matches!(code, "BUSY" | "STORE" | "INTERNAL")
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_retry(base_url, RetryPolicy::default())
    }

    pub fn with_retry(base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            retry,
        }
    }

    /// Send one action, retrying transient failures up to the budget.
    ///
    /// `params` must be a JSON object (or null for parameterless actions).
    pub async fn call(&self, action: &str, params: Value) -> Result<Value, ClientError> {
        let body = match params {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => {
                return Err(ClientError::Malformed(
                    "params must be a JSON object".to_string(),
                ))
            }
        };

        let mut attempt = 0;
        loop {
            let last = attempt + 1 >= self.retry.max_attempts;
            match self.send(action, &body).await {
                Ok(Outcome::Success(payload)) => return Ok(payload),
                Ok(Outcome::Failure { code, message }) => {
                    if !is_transient(&code) || last {
                        return Err(ClientError::Api { code, message });
                    }
                    tracing::warn!(action, code = %code, attempt, "transient failure, retrying");
                }
                Err(err) => {
                    if last {
                        return Err(err);
                    }
                    tracing::warn!(action, error = %err, attempt, "transport failure, retrying");
                }
            }
            self.backoff(attempt).await;
            attempt += 1;
        }
    }

    /// `checkIn` convenience wrapper.
    pub async fn check_in(
        &self,
        user_id: &str,
        activity_id: &str,
        location_id: &str,
        lat: f64,
        lng: f64,
    ) -> Result<Value, ClientError> {
        self.call(
            "checkIn",
            json!({
                "userId": user_id,
                "activityId": activity_id,
                "locationId": location_id,
                "userLat": lat,
                "userLng": lng,
            }),
        )
        .await
    }

    /// `login` convenience wrapper; returns the token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let payload = self
            .call("login", json!({ "username": username, "password": password }))
            .await?;
        payload
            .get("token")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| ClientError::Malformed("login response without token".to_string()))
    }

    async fn send(&self, action: &str, params: &Map<String, Value>) -> Result<Outcome, ClientError> {
        let mut body = params.clone();
        body.insert("action".to_string(), Value::String(action.to_string()));

        let response = self
            .http
            .post(format!("{}/api", self.base_url))
            .json(&Value::Object(body))
            .send()
            .await?;
        let envelope: Value = response.json().await?;

        match envelope.get("status").and_then(Value::as_str) {
            Some("success") => Ok(Outcome::Success(envelope)),
            Some("error") => Ok(Outcome::Failure {
                code: envelope
                    .get("code")
                    .and_then(Value::as_str)
                    .unwrap_or("INTERNAL")
                    .to_string(),
                message: envelope
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            _ => Err(ClientError::Malformed("missing status field".to_string())),
        }
    }

    async fn backoff(&self, attempt: u32) {
        let exponential = self.retry.base_delay * 2u32.pow(attempt);
        let jitter =
            Duration::from_millis(rand::thread_rng().gen_range(0..=self.retry.max_jitter_ms));
        tokio::time::sleep(exponential + jitter).await;
    }
}
