use std::time::Duration;

use async_trait::async_trait;

use crate::errors::{PopSentryError, PopSentryResult};
use crate::llm::provider::LlmProvider;
use crate::llm::types::{CallConfig, ChatMessage, LlmResponse};

const RETRY_BASE_DELAY_MS: u64 = 250;

pub struct OpenAiCompatibleProvider {
    id: String,
    api_base: String,
    api_key: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(id: String, api_base: String, api_key: String, max_retries: u32) -> Self {
        Self {
            id,
            api_base,
            api_key,
            max_retries,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.id
    }

    fn has_credentials(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn chat(&self, messages: Vec<ChatMessage>, cfg: &CallConfig) -> PopSentryResult<LlmResponse> {
        let body = serde_json::json!({
            "model": cfg.model,
            "messages": &messages,
            "temperature": cfg.temperature,
        });

        tracing::debug!(
            provider = %self.id,
            model = %cfg.model,
            messages = messages.len(),
            "sending LLM request"
        );
        tracing::trace!(body = %sanitized_for_log(&body), "request body (base64 omitted)");

        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Ok(response) => return Ok(response),
                Err(Attempt::Retryable(reason)) if attempt < self.max_retries => {
                    attempt += 1;
                    let delay = Duration::from_millis(RETRY_BASE_DELAY_MS << (attempt - 1));
                    tracing::warn!(
                        provider = %self.id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        reason = %reason,
                        "LLM request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(Attempt::Retryable(reason)) | Err(Attempt::Fatal(reason)) => {
                    return Err(PopSentryError::LlmProvider(reason));
                }
            }
        }
    }
}

enum Attempt {
    Retryable(String),
    Fatal(String),
}

impl OpenAiCompatibleProvider {
    async fn send_once(&self, body: &serde_json::Value) -> Result<LlmResponse, Attempt> {
        let response = self
            .client
            .post(&self.api_base)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Attempt::Retryable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let err_body = response.text().await.unwrap_or_default();
            let reason = format!("{status}: {err_body}");
            return Err(if status.is_server_error() || status.as_u16() == 429 {
                Attempt::Retryable(reason)
            } else {
                Attempt::Fatal(reason)
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Attempt::Fatal(format!("invalid response body: {e}")))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        tracing::info!(provider = %self.id, content_len = content.len(), "LLM JSON response received");
        Ok(LlmResponse { content })
    }
}

/// Copy of the request body with inline image payloads replaced, for logging.
fn sanitized_for_log(body: &serde_json::Value) -> String {
    let mut log_body = body.clone();
    if let Some(msgs) = log_body.get_mut("messages").and_then(|m| m.as_array_mut()) {
        for msg in msgs {
            let Some(parts) = msg.get_mut("content").and_then(|c| c.as_array_mut()) else {
                continue;
            };
            for part in parts {
                if part.get("type").and_then(|t| t.as_str()) == Some("image_url") {
                    if let Some(url) = part.get_mut("image_url").and_then(|i| i.get_mut("url")) {
                        *url = serde_json::Value::String("<omitted_base64_image>".to_string());
                    }
                }
            }
        }
    }
    serde_json::to_string(&log_body).unwrap_or_default()
}
