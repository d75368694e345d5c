//! Universal provider trait and the normalized request/response/error types.

use async_trait::async_trait;

/// One normalized completion request. The dispatcher collapses system prompt
/// and user content into a single prompt string before it reaches a provider,
/// so every family sends exactly one user message.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Wire model id; when empty the provider substitutes its configured model.
    pub model: String,
    /// Only honored by providers whose API requires an explicit ceiling.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: String::new(),
            max_tokens: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
}

/// Normalized error taxonomy. No backend-specific error type crosses this
/// boundary; callers branch on these variants only.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LLMError {
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Universal LLM provider trait
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Provider name (e.g., "gemini", "openai", "anthropic")
    fn name(&self) -> &str;

    /// Generate completion
    async fn generate(&self, request: CompletionRequest) -> Result<CompletionResponse, LLMError>;

    /// Get supported models
    fn supported_models(&self) -> Vec<String>;

    /// Validate request for this provider
    fn validate_request(&self, request: &CompletionRequest) -> Result<(), LLMError> {
        if request.prompt.trim().is_empty() {
            return Err(LLMError::InvalidRequest("prompt is empty".to_string()));
        }
        Ok(())
    }
}
