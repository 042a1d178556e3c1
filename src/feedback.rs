use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

const SYSTEM_PROMPT: &str =
    "Check the following English essay for grammar, style and structure.";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const MAX_RETRIES: usize = 3;
const BASE_BACKOFF_MS: u64 = 200;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("empty response")]
    EmptyResponse,
}

/// Seam between the submission workflow and the text-generation backend.
/// The production implementation talks to an OpenAI-compatible endpoint;
/// tests substitute a stub.
#[async_trait]
pub trait FeedbackProvider: Send + Sync {
    async fn review_essay(&self, essay: &str) -> Result<String, FeedbackError>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Debug, Deserialize)]
struct ChatContent {
    content: String,
}

/// Chat-completions client. The endpoint is swappable between the hosted
/// API (with `LLM_API_KEY`) and a local OpenAI-compatible server, which
/// needs no credential.
pub struct LlmFeedback {
    api_key: Option<String>,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl LlmFeedback {
    pub fn from_env() -> Self {
        let api_key = env_string("LLM_API_KEY");
        let model = env_string("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let endpoint = normalize_endpoint(
            env_string("LLM_API_ENDPOINT")
                .or_else(|| env_string("LLM_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
        );
        let timeout = Duration::from_millis(env_u64("LLM_TIMEOUT").unwrap_or(DEFAULT_TIMEOUT_MS));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            api_key,
            model,
            endpoint,
            client,
        }
    }

    async fn post_chat(&self, payload: &serde_json::Value) -> Result<ChatResponse, FeedbackError> {
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        let mut attempt = 0usize;

        loop {
            let mut request = self.client.post(&url).json(payload);
            if let Some(key) = self.api_key.as_deref() {
                request = request.bearer_auth(key);
            }

            let (retryable, err) = match request.send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(resp.json::<ChatResponse>().await?);
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    (is_retryable(status), FeedbackError::HttpStatus { status, body })
                }
                Err(err) => (true, FeedbackError::Request(err)),
            };

            if !retryable || attempt >= MAX_RETRIES {
                return Err(err);
            }
            let backoff = Duration::from_millis(BASE_BACKOFF_MS << attempt);
            warn!(attempt, error = %err, "feedback request failed, retrying");
            sleep(backoff).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl FeedbackProvider for LlmFeedback {
    async fn review_essay(&self, essay: &str) -> Result<String, FeedbackError> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": essay },
            ],
            "stream": false,
        });

        let response = self.post_chat(&payload).await?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(FeedbackError::EmptyResponse)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key)?.parse().ok()
}

fn normalize_endpoint(endpoint: String) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.ends_with("/v1") || trimmed.contains("/v1/") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}
