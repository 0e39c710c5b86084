//! Completion service client (OpenAI Responses API).
//!
//! Sends a system + user instruction pair and returns the model's output
//! text. Upstream failures are classified for the HTTP layer:
//! - 429 becomes `ApiError::RateLimited`
//! - 5xx, timeouts and connection failures become `ApiError::UpstreamUnavailable`
//! - truncated or empty output becomes `ApiError::Generation`

use anyhow::{Context, Result};
use axum::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::error::ApiError;

/// One completion call.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub request_id: Option<&'a str>,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ApiError>;

    async fn health_check(&self) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesBody {
    /// Concatenated text of all `output_text` parts of message items.
    fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.kind == "message")
            .flat_map(|item| item.content.iter())
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

/// Error response from the completion service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for the OpenAI Responses API.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, model = model, "Completion client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    fn classify_status(status: StatusCode, message: String) -> ApiError {
        match status {
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!("Completion service authentication failed");
                ApiError::Internal(anyhow::anyhow!("AI service auth error"))
            }
            s if s.is_server_error() => ApiError::UpstreamUnavailable(message),
            _ => {
                error!(status = %status, message = %message, "Completion service error");
                ApiError::Generation(message)
            }
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ApiError> {
        let url = format!("{}/responses", self.base_url);

        let mut req = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ResponsesRequest {
                model: &self.model,
                input: vec![
                    InputMessage {
                        role: "system",
                        content: request.system,
                    },
                    InputMessage {
                        role: "user",
                        content: request.prompt,
                    },
                ],
            });

        if let Some(rid) = request.request_id {
            req = req.header("x-request-id", rid);
        }

        debug!(url = %url, prompt_chars = request.prompt.len(), "Completion service request");

        let response = req.send().await.map_err(|e| {
            error!(error = %e, "Completion service request failed");
            ApiError::UpstreamUnavailable(format!("AI service unavailable: {}", e))
        })?;

        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("AI service error: {}", status));
            return Err(Self::classify_status(status, message));
        }

        let body: ResponsesBody = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse completion service response");
            ApiError::Generation(format!("Invalid AI service response: {}", e))
        })?;

        if body.status.as_deref() == Some("incomplete") {
            return Err(ApiError::Generation(
                "completion output was truncated".to_string(),
            ));
        }

        let text = body.output_text();
        if text.trim().is_empty() {
            return Err(ApiError::Generation("completion output was empty".to_string()));
        }

        Ok(text)
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/models", self.base_url);

        self.client
            .get(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("AI service health check failed")?
            .error_for_status()
            .context("AI service unhealthy")?;

        Ok(())
    }
}
