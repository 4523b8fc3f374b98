use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            endpoint: GEMINI_ENDPOINT.to_string(),
        }
    }

    /// Reads `HOTEL_GEMINI_API_KEY` and `HOTEL_GEMINI_MODEL`. Returns `None`
    /// when no key is set, which selects the offline responder.
    pub fn from_env() -> Option<Self> {
        Self::from_values(
            env::var("HOTEL_GEMINI_API_KEY").ok(),
            env::var("HOTEL_GEMINI_MODEL").ok(),
        )
    }

    fn from_values(api_key: Option<String>, model: Option<String>) -> Option<Self> {
        let api_key = non_blank(api_key)?;
        let mut config = Self::new(api_key);
        if let Some(model) = non_blank(model) {
            config.model = model;
        }
        Some(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Client for the Google Generative Language `generateContent` call.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        );
        let payload = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [ { "text": prompt } ]
                }
            ]
        });

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", self.config.api_key.as_str())
            .json(&payload)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini non-success status {}: {}", status.as_u16(), body);
        }

        let body: Value = response.json().await.context("Gemini parse failed")?;
        extract_gemini_text(&body)
            .filter(|value| !value.trim().is_empty())
            .context("Gemini output text missing")
    }
}

/// Joins the text parts of the first candidate.
pub fn extract_gemini_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let chunks = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|value| value.as_str()))
        .collect::<Vec<_>>();

    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join(""))
    }
}

/// Text generation backend used by the chat gateway.
#[derive(Debug, Clone)]
pub enum TextGenerator {
    Gemini(GeminiClient),
    /// No remote model configured; replies come from the offline responder.
    Offline,
}

impl TextGenerator {
    pub fn gemini(config: GeminiConfig) -> Result<Self> {
        Ok(Self::Gemini(GeminiClient::new(config)?))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Gemini(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Gemini(client) => client.model(),
            Self::Offline => "offline",
        }
    }

    /// `Ok(None)` means no remote model is configured.
    pub async fn generate(&self, prompt: &str) -> Result<Option<String>> {
        match self {
            Self::Gemini(client) => client.generate(prompt).await.map(Some),
            Self::Offline => Ok(None),
        }
    }
}
