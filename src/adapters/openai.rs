//! OpenAI-compatible chat-completions client.

use crate::config::toml_config::LlmConfig;
use crate::domain::model::TokenUsage;
use crate::domain::ports::{Completion, CompletionRequest, LanguageModel};
use crate::utils::error::{CleanerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    config: LlmConfig,
    usage: Mutex<TokenUsage>,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig, api_key: Option<&str>) -> Result<Self> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(CleanerError::MissingApiKey)?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let endpoint = format!("{}/chat/completions", config.api_base.trim_end_matches('/'));
        tracing::debug!("LLM endpoint: {} (model {})", endpoint, config.model);

        Ok(Self {
            client,
            endpoint,
            api_key,
            config: config.clone(),
            usage: Mutex::new(TokenUsage::default()),
        })
    }

    async fn send_once(&self, body: &ChatRequest<'_>) -> Result<Completion> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!("LLM response status: {} ({} bytes)", status, text.len());

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| text.chars().take(200).collect());
            return Err(CleanerError::LlmStatusError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| CleanerError::LlmResponseError {
                message: format!("unexpected response body: {}", e),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| CleanerError::LlmResponseError {
                message: "response contained no message content".to_string(),
            })?;

        Ok(Completion {
            content,
            usage: parsed.usage.unwrap_or_default(),
        })
    }

    fn record_usage(&self, usage: &TokenUsage) {
        if let Ok(mut total) = self.usage.lock() {
            total.add(usage);
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let body = ChatRequest {
            model: request.model.as_deref().unwrap_or(&self.config.model),
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
            temperature: self.config.temperature,
            max_tokens: request.max_tokens,
        };

        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Ok(completion) => {
                    self.record_usage(&completion.usage);
                    return Ok(completion);
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self
                        .config
                        .retry_delay_ms
                        .saturating_mul(1u64 << attempt.min(10));
                    attempt += 1;
                    tracing::warn!(
                        "LLM call failed ({}), retry {}/{} in {}ms",
                        e,
                        attempt,
                        self.config.max_retries,
                        delay
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => {
                    tracing::error!("OpenAI API call failed: {}", e);
                    return Err(e);
                }
            }
        }
    }

    fn usage(&self) -> TokenUsage {
        self.usage.lock().map(|u| *u).unwrap_or_default()
    }
}
