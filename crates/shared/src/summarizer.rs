use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::PipelineSettings;
use crate::error::{BriefingError, Provider, Result};
use crate::http;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    text: String,
}

impl ClaudeResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .content
            .into_iter()
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Sends a prompt to the Anthropic Messages API and returns the generated text
pub struct ClaudeSummarizer {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeSummarizer {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        settings: &PipelineSettings,
    ) -> Result<Self> {
        Ok(Self {
            client: http::build_client(Provider::Ai, settings.ai_timeout)?,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        })
    }

    /// Single best-effort call; no retries
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = http::endpoint(Provider::Ai, &self.base_url, "messages", &[])?;

        let request = ClaudeRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Sending prompt to Claude");

        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| http::transport(Provider::Ai, "Failed to send request to Claude API", e))?;

        let claude_response = http::ensure_success(Provider::Ai, response)
            .await?
            .json::<ClaudeResponse>()
            .await
            .map_err(|e| http::transport(Provider::Ai, "Failed to parse Claude API response", e))?;

        claude_response
            .into_text()
            .ok_or_else(|| BriefingError::upstream(Provider::Ai, "Claude returned an empty response"))
    }
}
