use std::time::Duration;

use crate::ai_types::{ChatRequest, ChatResponse};
use crate::error::LlmError;

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default API origin; `/v1/chat/completions` is appended.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
/// Providers speaking the OpenAI chat completion protocol.
pub const SUPPORTED_PROVIDERS: [&str; 2] = ["openai", "openai-compatible"];

const ERROR_BODY_PREVIEW: usize = 200;

/// Lowercase the configured provider, coercing anything unsupported to `openai`.
#[must_use]
pub fn normalize_provider(provider: &str) -> &'static str {
    let provider = provider.trim().to_lowercase();
    SUPPORTED_PROVIDERS.into_iter().find(|p| *p == provider).unwrap_or("openai")
}

/// Client for LLM API calls.
pub struct LlmClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) model: String,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("client", &self.client)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl LlmClient {
    /// Creates a new LLM client. Every request is bounded by `timeout`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        let base_url = match base_url.trim().trim_end_matches('/') {
            "" => DEFAULT_BASE_URL.to_owned(),
            trimmed => trimmed.to_owned(),
        };
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;
        Ok(Self { client, api_key, base_url, model: DEFAULT_MODEL.to_owned() })
    }

    /// Sets a custom model for this client. Blank names keep the default.
    #[must_use]
    pub fn with_model(mut self, model: &str) -> Self {
        let model = model.trim();
        if !model.is_empty() {
            model.clone_into(&mut self.model);
        }
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a chat completion request and return the trimmed content of the
    /// first choice. A single attempt is made.
    ///
    /// # Errors
    /// Returns an error if the HTTP request fails or times out, the API
    /// returns a non-success status, the response body cannot be parsed, or
    /// the first choice has no non-blank content.
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body =
                response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());
            return Err(LlmError::HttpStatus {
                code: status.as_u16(),
                body: truncate(&body, ERROR_BODY_PREVIEW).to_owned(),
            });
        }

        let body = response.text().await?;
        let chat_response: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::JsonParse {
                context: format!(
                    "chat completion response (body: {})",
                    truncate(&body, ERROR_BODY_PREVIEW)
                ),
                source: e,
            })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_owned())
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Truncates a string to the given maximum byte length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
