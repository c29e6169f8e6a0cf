use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use deskroute_core::config::LlmSettings;

/// One system + user exchange with a chat model.
pub trait ChatModel: Send + Sync {
    fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint
/// (OpenAI, OpenRouter, local gateways).
pub struct OpenAiChatClient {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ChatRespChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResp {
    choices: Vec<ChatRespChoice>,
}

/// Server-side and rate-limit failures are worth another attempt.
pub fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

impl OpenAiChatClient {
    /// `Ok(None)` when the model is disabled or no API key is configured.
    pub fn from_settings(settings: &LlmSettings) -> Result<Option<Self>> {
        let Some(api_key) = settings.api_key.clone().filter(|_| settings.is_available()) else {
            return Ok(None);
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("building http client")?;
        Ok(Some(Self {
            api_key,
            base_url: settings.effective_base_url().trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            max_retries: settings.max_retries,
            client,
        }))
    }

    pub fn model(&self) -> &str { &self.model }

    fn send_once(&self, body: &serde_json::Value) -> Attempt {
        let url = format!("{}/chat/completions", self.base_url);
        let resp = match self.client.post(&url).bearer_auth(&self.api_key).json(body).send() {
            Ok(resp) => resp,
            Err(e) => return Attempt::Retry(anyhow!(e).context("chat request failed")),
        };
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().unwrap_or_default();
            let err = anyhow!("chat endpoint error {}: {}", status, txt);
            return if is_retryable(status) { Attempt::Retry(err) } else { Attempt::Fail(err) };
        }
        match resp.json::<ChatResp>() {
            Ok(parsed) => Attempt::Done(parsed.choices.into_iter().next().and_then(|c| c.message.content).unwrap_or_default()),
            Err(e) => Attempt::Fail(anyhow!(e).context("decoding chat response")),
        }
    }
}

enum Attempt {
    Done(String),
    Retry(anyhow::Error),
    Fail(anyhow::Error),
}

impl ChatModel for OpenAiChatClient {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });
        let mut attempt = 0u32;
        loop {
            match self.send_once(&body) {
                Attempt::Done(content) => {
                    debug!(model = %self.model, attempt, chars = content.len(), "chat completion");
                    return Ok(content);
                }
                Attempt::Retry(err) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(model = %self.model, attempt, "retrying chat request: {:#}", err);
                    thread::sleep(Duration::from_millis(250 * u64::from(attempt)));
                }
                Attempt::Retry(err) | Attempt::Fail(err) => return Err(err),
            }
        }
    }
}
