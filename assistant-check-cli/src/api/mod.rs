use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::Config;

mod error;

pub use error::{looks_rate_limited, ApiError};

/// One message of the conversation sent to the assistant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request payload for the assistant endpoint
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// Response envelope from the assistant endpoint
///
/// Every field is optional; the checks look for keys and tolerate absence.
/// A field of the wrong type is treated as absent instead of failing the parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantResponse {
    #[serde(
        default,
        deserialize_with = "lenient_message",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,

    /// Tool results keyed by tool call id, each normally a free-form object
    #[serde(
        rename = "toolResults",
        default,
        deserialize_with = "lenient_tool_results",
        skip_serializing_if = "Option::is_none"
    )]
    pub tool_results: Option<BTreeMap<String, Value>>,

    /// Upstream error, a plain string or an object such as `{"message", "code"}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

fn lenient_message<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(message)) => Some(message),
        Some(Value::Null) | None => None,
        Some(other) => {
            tracing::warn!("Ignoring non-string message field: {}", other);
            None
        }
    })
}

fn lenient_tool_results<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(results)) => Some(results.into_iter().collect()),
        Some(Value::Null) | None => None,
        Some(other) => {
            tracing::warn!("Ignoring toolResults that is not an object: {}", other);
            None
        }
    })
}

impl AssistantResponse {
    /// Error text whatever JSON type the server used for it
    pub fn error_text(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Message text if present and not blank
    pub fn message_text(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.tool_results.is_none()
    }
}

/// A reply received from the endpoint, with the status it came with
#[derive(Debug)]
pub struct Exchange {
    pub status: StatusCode,
    pub response: AssistantResponse,
    pub elapsed: Duration,
}

/// HTTP client for the admin assistant endpoint
pub struct AssistantClient {
    client: Client,
    url: String,
    timeout_seconds: u64,
}

impl AssistantClient {
    /// Create a new client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let timeout_seconds = config.api.timeout_seconds;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: config.api.endpoint_url(),
            timeout_seconds,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    /// Send a single-message conversation and wait for the reply
    ///
    /// Only HTTP 200 counts as a reply. There are no retries: a timeout or a
    /// transport failure is reported straight back to the caller.
    pub async fn send(&self, content: &str) -> Result<Exchange, ApiError> {
        let request = ChatRequest {
            messages: vec![ChatMessage::user(content)],
        };

        tracing::debug!("POST {} with message {:?}", self.url, content);
        let started = std::time::Instant::now();

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(e, self.timeout_seconds))?;

        let status = response.status();
        tracing::debug!("Received {} after {:?}", status, started.elapsed());

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Assistant returned {}: {}", status, body);
            return Err(ApiError::from_status(status, body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(e, self.timeout_seconds))?;

        let parsed: AssistantResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;

        Ok(Exchange {
            status,
            response: parsed,
            elapsed: started.elapsed(),
        })
    }

    /// Send a message and return the raw JSON body, whatever its shape
    pub async fn send_raw(&self, content: &str) -> Result<(StatusCode, Value)> {
        let request = ChatRequest {
            messages: vec![ChatMessage::user(content)],
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(e, self.timeout_seconds))?;

        let status = response.status();
        let body = response.text().await.context("Failed to read response body")?;
        let value = serde_json::from_str(&body).unwrap_or(Value::String(body));

        Ok((status, value))
    }
}
