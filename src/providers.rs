//! Completion provider boundary.
//!
//! `CompletionProvider` is the seam between the pipeline and the outside
//! world: it turns a system/user instruction pair into raw completion text and
//! nothing more. `OpenAiProvider` speaks the OpenAI-compatible
//! `/chat/completions` protocol.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use url::Url;

use crate::config::ProviderSettings;
use crate::{log_debug, log_error, log_warn};

/// One chat-completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f64,
}

/// Provider call failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("request to provider failed: {0}")]
    Transport(String),
    #[error("provider returned HTTP {status}")]
    Status { status: u16, body: String },
    #[error("provider did not respond within {0:?}")]
    Timeout(Duration),
    #[error("unreadable provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Transient failures worth another attempt. Client errors other than 429 are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse(_) => false,
        }
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run one completion and return the first choice's message text
    async fn complete(
        &self,
        api_key: &SecretString,
        request: &CompletionRequest,
    ) -> Result<String, ProviderError>;
}

/// Client for OpenAI-compatible chat-completion endpoints
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
    max_retries: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            timeout: Duration::from_secs(60),
            max_retries: 0,
        }
    }

    pub fn from_settings(settings: &ProviderSettings) -> anyhow::Result<Self> {
        Ok(Self::new(settings.endpoint()?)
            .with_timeout(settings.timeout())
            .with_max_retries(settings.max_retries))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send_once(
        &self,
        api_key: &SecretString,
        body: &ChatRequest<'_>,
    ) -> Result<String, ProviderError> {
        let call = async {
            let response = self
                .client
                .post(self.endpoint.clone())
                .bearer_auth(api_key.expose_secret())
                .json(body)
                .send()
                .await
                .map_err(|e| ProviderError::Transport(e.to_string()))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| ProviderError::Transport(e.to_string()))?;
            Ok::<_, ProviderError>((status, text))
        };

        let (status, text) = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))??;

        if !status.is_success() {
            log_error!("Provider API error ({}): {}", status, text);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            log_error!("Provider returned an unreadable envelope ({}): {}", e, text);
            ProviderError::InvalidResponse(e.to_string())
        })?;

        Ok(envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        api_key: &SecretString,
        request: &CompletionRequest,
    ) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
        };

        log_debug!(
            "Calling {} with model {} ({} retries allowed)",
            self.endpoint,
            request.model,
            self.max_retries
        );

        let retry_strategy = ExponentialBackoff::from_millis(10)
            .factor(2)
            .max_delay(Duration::from_secs(5))
            .take(self.max_retries);

        RetryIf::start(
            retry_strategy,
            || self.send_once(api_key, &body),
            |e: &ProviderError| {
                let retry = e.is_retryable();
                if retry {
                    log_warn!("Provider attempt failed with a transient error: {}", e);
                }
                retry
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ProviderError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(ProviderError::Transport("reset".into()).is_retryable());
        assert!(
            ProviderError::Status {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            ProviderError::Status {
                status: 429,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !ProviderError::Status {
                status: 401,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!ProviderError::InvalidResponse("eof".into()).is_retryable());
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "usr",
                },
            ],
            temperature: 0.5,
        };
        let value = serde_json::to_value(&body).expect("body serializes");
        assert_eq!(
            value,
            serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "usr"}
                ],
                "temperature": 0.5
            })
        );
    }

    #[test]
    fn test_envelope_without_content_yields_empty_text() {
        let envelope: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#)
                .expect("envelope parses");
        let content = envelope
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);
        assert_eq!(content, None);

        let envelope: ChatResponse = serde_json::from_str("{}").expect("envelope parses");
        assert!(envelope.choices.is_empty());
    }
}
