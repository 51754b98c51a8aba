//! LLM-backed article summarization: turns article text into bullet points
//! via an OpenAI-style chat-completions endpoint.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const MODEL: &str = "gpt-3.5-turbo";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Inputs past this length are truncated before the prompt is built.
const MAX_INPUT_LEN: usize = 10_000;

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Request timed out after 60s")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("LLM API error: {0}")]
    Api(String),
    #[error("LLM response contained no choices")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Clone)]
pub struct Summarizer {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl Summarizer {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: SecretString::from(api_key),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Condense article text into at most `max_points` bullet points.
    pub async fn bullet_points(
        &self,
        text: &str,
        max_points: u32,
    ) -> Result<String, SummarizeError> {
        let text = if text.len() > MAX_INPUT_LEN {
            let mut end = MAX_INPUT_LEN;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            &text[..end]
        } else {
            text
        };

        let request = ChatRequest {
            model: MODEL.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: format!(
                    "Please turn this article into {} bullet points:\n\n{}",
                    max_points, text
                ),
            }],
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = tokio::time::timeout(
            REQUEST_TIMEOUT,
            self.http
                .post(&url)
                .header(
                    "Authorization",
                    format!("Bearer {}", self.api_key.expose_secret()),
                )
                .json(&request)
                .send(),
        )
        .await
        .map_err(|_| SummarizeError::Timeout)?
        .map_err(SummarizeError::Network)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Api(format!("status {}: {}", status, body)));
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .ok_or(SummarizeError::EmptyResponse)?
            .message
            .content;

        Ok(content)
    }
}
