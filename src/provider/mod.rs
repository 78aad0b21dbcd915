//! Completion provider boundary.
//!
//! Exactly one chat-completion call per Spark request: fixed model, bounded
//! output length, fixed sampling temperature. No retries — a failed or
//! timed-out call surfaces as `Upstream` and the caller may resubmit.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SparkConfig;
use crate::error::SparkError;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one prompt, return the first candidate completion's text.
    async fn complete(&self, prompt: &str) -> Result<String, SparkError>;
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// First candidate's text, if the provider returned one.
fn first_choice_text(response: ChatResponse) -> Option<String> {
    response.choices.into_iter().next()?.message.content
}

// ─── OpenAI-compatible client ─────────────────────────────────────────────────

pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(config: &SparkConfig) -> anyhow::Result<Self> {
        // Bounded timeout so a slow upstream cannot hold a request open.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.provider_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.provider_url.clone(),
            api_key: config.provider_api_key.clone().unwrap_or_default(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<String, SparkError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SparkError::Upstream(e.to_string()))?;

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| SparkError::Upstream(e.to_string()))?;

        first_choice_text(body)
            .ok_or_else(|| SparkError::Upstream("response had no completion choices".to_string()))
    }
}
