//! Anthropic messages adapter.
//!
//! Unlike the chat-completions family, this API requires an explicit
//! `max_tokens` on every request; the configured default applies when the
//! request carries none.

use async_trait::async_trait;
use genstudio_config::constants::{defaults, env_vars, message_roles, models, urls};
use reqwest::Client as HttpClient;
use serde_json::{Value, json};

use super::common::override_base_url;
use crate::llm::error_display;
use crate::llm::provider::{CompletionRequest, CompletionResponse, LLMError, LLMProvider};

const PROVIDER_NAME: &str = "Anthropic";
const PROVIDER_KEY: &str = "anthropic";

pub struct AnthropicProvider {
    api_key: String,
    http_client: HttpClient,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            http_client: HttpClient::new(),
            base_url: override_base_url(
                urls::ANTHROPIC_API_BASE,
                base_url,
                Some(env_vars::ANTHROPIC_BASE_URL),
            ),
            model,
        }
    }

    fn build_payload(&self, request: &CompletionRequest) -> Value {
        let model = if request.model.trim().is_empty() {
            &self.model
        } else {
            &request.model
        };

        json!({
            "model": model,
            "max_tokens": request
                .max_tokens
                .unwrap_or(defaults::ANTHROPIC_DEFAULT_MAX_TOKENS),
            "messages": [{
                "role": message_roles::USER,
                "content": request.prompt,
            }],
        })
    }

    fn parse_response(response_json: Value) -> Result<CompletionResponse, LLMError> {
        let content = response_json
            .get("content")
            .and_then(|value| value.as_array())
            .ok_or_else(|| {
                LLMError::Provider(error_display::format_llm_error(
                    PROVIDER_NAME,
                    "Invalid response format: missing content",
                ))
            })?;

        let text = content
            .iter()
            .filter_map(|block| block.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(LLMError::Provider(error_display::format_llm_error(
                PROVIDER_NAME,
                "No text blocks in response",
            )));
        }

        Ok(CompletionResponse { content: text })
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn name(&self) -> &str {
        PROVIDER_KEY
    }

    async fn generate(&self, request: CompletionRequest) -> Result<CompletionResponse, LLMError> {
        self.validate_request(&request)?;

        let payload = self.build_payload(&request);
        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", urls::ANTHROPIC_API_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                LLMError::Network(error_display::format_network_error(PROVIDER_NAME, &err))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(LLMError::Authentication(error_display::format_llm_error(
                    PROVIDER_NAME,
                    "Authentication failed (check ANTHROPIC_API_KEY)",
                )));
            }

            if status.as_u16() == 429 || error_text.contains("rate_limit") {
                return Err(LLMError::RateLimit);
            }

            return Err(LLMError::Provider(error_display::format_llm_error(
                PROVIDER_NAME,
                &format!("HTTP {status}: {error_text}"),
            )));
        }

        let response_json: Value = response.json().await.map_err(|err| {
            LLMError::Provider(error_display::format_parse_error(PROVIDER_NAME, &err))
        })?;

        Self::parse_response(response_json)
    }

    fn supported_models(&self) -> Vec<String> {
        vec![models::CLAUDE_3_5_SONNET.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new("test-key".to_string(), "claude-test".to_string(), None)
    }

    #[test]
    fn payload_defaults_max_tokens() {
        let payload = provider().build_payload(&CompletionRequest::new("hi"));
        assert_eq!(payload["max_tokens"], 4096);
        assert_eq!(payload["messages"][0]["role"], "user");
    }

    #[test]
    fn payload_honors_explicit_max_tokens() {
        let request = CompletionRequest::new("refactor").with_max_tokens(8192);
        let payload = provider().build_payload(&request);
        assert_eq!(payload["max_tokens"], 8192);
    }

    #[test]
    fn parse_joins_text_blocks() {
        let body = json!({
            "content": [
                {"type": "text", "text": "part one"},
                {"type": "text", "text": " and two"}
            ]
        });
        let response = AnthropicProvider::parse_response(body).unwrap();
        assert_eq!(response.content, "part one and two");
    }

    #[test]
    fn parse_rejects_missing_content() {
        let err = AnthropicProvider::parse_response(json!({"id": "msg"})).unwrap_err();
        assert!(matches!(err, LLMError::Provider(_)));
    }
}
