use std::future::Future;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::SummaryError;
use crate::retry::retry;

/// Longest transcript prefix, in characters, sent to the model
pub const MAX_TRANSCRIPT_CHARS: usize = 7000;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant tasked with summarizing YouTube transcripts.";

pub const DEFAULT_INSTRUCTION: &str = "You are a YouTube Video Summarizer tasked with providing an in-depth analysis \
of a video's content. Your goal is to generate a comprehensive summary that captures the main points, key arguments, \
and supporting details within a 750-word limit. Please thoroughly analyze the transcript text provided and offer a \
detailed summary, ensuring to cover all relevant aspects of the video: ";

/// Anything that turns a transcript into a summary
pub trait Summarizer {
    fn summarize(&self, transcript: &str, instruction: &str) -> impl Future<Output = Result<String, SummaryError>> + Send;
}

/// Hosted completion provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Groq,
    Openai,
    Anthropic,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::Openai => "OpenAI",
            Provider::Anthropic => "Anthropic",
        }
    }

    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::Openai => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::Openai => "https://api.openai.com/v1",
            Provider::Anthropic => "https://api.anthropic.com/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Groq => "llama-3.3-70b-versatile",
            Provider::Openai => "gpt-4o-mini",
            Provider::Anthropic => "claude-sonnet-4-6",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sampling and transport knobs for the completion endpoint
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub provider: Provider,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_retries: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Groq,
            model: Provider::Groq.default_model().to_string(),
            temperature: 0.0,
            max_tokens: 7096,
            max_retries: 3,
        }
    }
}

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// The human-role message: instruction followed by the bounded transcript prefix
pub fn build_user_message(instruction: &str, transcript: &str) -> String {
    let prefix = truncate_chars(transcript, MAX_TRANSCRIPT_CHARS);
    if prefix.len() < transcript.len() {
        debug!(
            "Transcript truncated to {MAX_TRANSCRIPT_CHARS} of {} characters",
            transcript.chars().count()
        );
    }
    format!("{instruction}{prefix}")
}

/// Chat-completion client for the configured provider
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    settings: CompletionSettings,
}

impl CompletionClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, settings: CompletionSettings) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: settings.provider.default_base_url().to_string(),
            settings,
        }
    }

    /// Build a client with the key taken from the provider's environment variable
    pub fn from_env(client: reqwest::Client, settings: CompletionSettings) -> Result<Self, SummaryError> {
        let var = settings.provider.api_key_var();
        let api_key = std::env::var(var).map_err(|_| SummaryError::MissingApiKey {
            provider: settings.provider.name().to_string(),
            env_var: var.to_string(),
        })?;
        Ok(Self::new(client, api_key, settings))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    /// Send the two-message conversation, retrying transient failures
    pub async fn generate_summary(&self, transcript: &str, instruction: &str) -> Result<String, SummaryError> {
        let user_message = build_user_message(instruction, transcript);
        let user_message = user_message.as_str();
        retry(self.settings.max_retries, SummaryError::is_transient, move || {
            self.complete(user_message)
        })
        .await
    }

    async fn complete(&self, user_message: &str) -> Result<String, SummaryError> {
        debug!(
            "Summarizing via {} API with model {}",
            self.settings.provider, self.settings.model
        );
        match self.settings.provider {
            Provider::Anthropic => self.complete_anthropic(user_message).await,
            Provider::Groq | Provider::Openai => self.complete_openai(user_message).await,
        }
    }

    async fn complete_anthropic(&self, user_message: &str) -> Result<String, SummaryError> {
        let body = serde_json::json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "system": SYSTEM_PROMPT,
            "messages": [
                {
                    "role": "user",
                    "content": user_message
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let json = self.check_response(resp).await?;
        extract_anthropic_text(&json)
    }

    async fn complete_openai(&self, user_message: &str) -> Result<String, SummaryError> {
        let body = serde_json::json!({
            "model": self.settings.model,
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_PROMPT
                },
                {
                    "role": "user",
                    "content": user_message
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let json = self.check_response(resp).await?;
        extract_openai_text(&json, self.settings.provider)
    }

    async fn check_response(&self, resp: reqwest::Response) -> Result<serde_json::Value, SummaryError> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SummaryError::Api {
                provider: self.settings.provider.name().to_string(),
                status,
                body,
            });
        }
        Ok(resp.json().await?)
    }
}

impl Summarizer for CompletionClient {
    fn summarize(&self, transcript: &str, instruction: &str) -> impl Future<Output = Result<String, SummaryError>> + Send {
        self.generate_summary(transcript, instruction)
    }
}

fn extract_anthropic_text(json: &serde_json::Value) -> Result<String, SummaryError> {
    if let Some(content) = json.get("content").and_then(|c| c.as_array()) {
        let text: String = content
            .iter()
            .filter_map(|block| {
                if block.get("type")?.as_str()? == "text" {
                    block.get("text")?.as_str().map(|s| s.to_string())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");
        if !text.is_empty() {
            return Ok(text);
        }
    }
    Err(SummaryError::UnexpectedResponse(Provider::Anthropic.name().to_string()))
}

fn extract_openai_text(json: &serde_json::Value, provider: Provider) -> Result<String, SummaryError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| SummaryError::UnexpectedResponse(provider.name().to_string()))
}
