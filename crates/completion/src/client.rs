use app_error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::{MAX_TOKENS, SYSTEM_PROMPT, TEMPERATURE};

/// A single-turn chat completion backend.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `user_message` with the fixed system prompt and return the
    /// assistant's reply.
    async fn complete(&self, user_message: &str) -> AppResult<String>;
}

/// Client for Groq's OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

impl GroqClient {
    /// Create a new client. `base_url` is the API root, e.g.
    /// `https://api.groq.com/openai/v1`.
    pub fn new(api_key: &str, base_url: &str, model: &str) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, user_message: &str) -> AppResult<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!("Requesting completion from {} ({})", self.endpoint, self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach completion provider: {}", e);
                AppError::provider(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Completion provider returned {}: {}", status, text);
            return Err(AppError::provider(format!(
                "Error code: {} - {}",
                status.as_u16(),
                text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to parse completion response: {}", e);
            AppError::provider(format!("Invalid provider response: {}", e))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::provider("Provider returned no choices"))?
            .message
            .content
            .ok_or_else(|| AppError::provider("Provider returned an empty message"))?;

        info!("Completion received ({} chars)", content.len());
        Ok(content)
    }
}
