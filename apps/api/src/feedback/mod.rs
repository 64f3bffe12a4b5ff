//! Feedback generator: the single point of entry for natural-language feedback.
//!
//! The generator is best-effort. Callers go through `feedback_or_placeholder`,
//! which never fails: any error becomes "AI feedback unavailable: <reason>" and
//! the score and verdict are returned untouched.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

use prompts::build_feedback_prompt;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 300;
/// Upper bound accepted for `FEEDBACK_MAX_RETRIES`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("generator returned empty content")]
    EmptyContent,

    #[error("no API key configured")]
    NotConfigured,
}

/// Produces free-form improvement suggestions for a resume against a JD.
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate(&self, resume_text: &str, jd_text: &str) -> Result<String, FeedbackError>;
}

/// Runs the generator and folds every failure into the placeholder string.
pub async fn feedback_or_placeholder(
    generator: &dyn FeedbackGenerator,
    resume_text: &str,
    jd_text: &str,
) -> String {
    match generator.generate(resume_text, jd_text).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!("Feedback generation failed: {e}");
            format!("AI feedback unavailable: {e}")
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedbackSettings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    /// Per-attempt request timeout. Expiry counts as a failed attempt.
    pub timeout: Duration,
    /// Retries after the first attempt, on transport errors, 429 and 5xx.
    pub max_retries: u32,
    /// First backoff delay; doubles on each retry.
    pub retry_base_delay: Duration,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
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
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl ChatResponse {
    fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct OpenAiFeedback {
    client: Client,
    settings: FeedbackSettings,
}

impl OpenAiFeedback {
    pub fn new(settings: FeedbackSettings) -> Result<Self, FeedbackError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn is_configured(&self) -> bool {
        self.settings.api_key.is_some()
    }

    async fn call(&self, prompt: &str) -> Result<String, FeedbackError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(FeedbackError::NotConfigured)?;

        let request_body = ChatRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<FeedbackError> = None;

        for attempt in 0..=self.settings.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.settings.retry_base_delay, attempt);
                warn!(
                    "Feedback call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.settings.api_url)
                .bearer_auth(api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(FeedbackError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Feedback API returned {}: {}", status, body);
                last_error = Some(if status.as_u16() == 429 {
                    FeedbackError::RateLimited { retries: attempt }
                } else {
                    FeedbackError::Api {
                        status: status.as_u16(),
                        message: body,
                    }
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(FeedbackError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let parsed: ChatResponse = serde_json::from_str(&body)?;
            let text = parsed.text().ok_or(FeedbackError::EmptyContent)?;

            debug!("Feedback call succeeded after {} attempt(s)", attempt + 1);
            return Ok(text.to_string());
        }

        Err(last_error.unwrap_or(FeedbackError::RateLimited {
            retries: self.settings.max_retries,
        }))
    }
}

#[async_trait]
impl FeedbackGenerator for OpenAiFeedback {
    async fn generate(&self, resume_text: &str, jd_text: &str) -> Result<String, FeedbackError> {
        let prompt = build_feedback_prompt(resume_text, jd_text);
        self.call(&prompt).await
    }
}


/// Delay before retry `attempt` (1-based): `base`, `2 * base`, `4 * base`, ...
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}
