//! OpenAI-compatible chat-completions adapter.
//!
//! OpenAI, DeepSeek, and Perplexity all speak the same `/chat/completions`
//! wire format; one adapter serves all three, distinguished only by base URL
//! and display label. Keeping them as a single type means a new compatible
//! host is a registry entry, not a new provider implementation.

use async_trait::async_trait;
use genstudio_config::constants::{env_vars, message_roles, models, urls};
use genstudio_config::models::Provider;
use reqwest::Client as HttpClient;
use serde_json::{Value, json};

use super::common::override_base_url;
use crate::llm::error_display;
use crate::llm::provider::{CompletionRequest, CompletionResponse, LLMError, LLMProvider};

pub struct OpenAIChatProvider {
    provider: Provider,
    api_key: String,
    http_client: HttpClient,
    base_url: String,
    model: String,
}

impl OpenAIChatProvider {
    pub fn new(
        provider: Provider,
        api_key: String,
        model: String,
        base_url: Option<String>,
    ) -> Self {
        let (default_base, env_override) = match provider {
            Provider::DeepSeek => (urls::DEEPSEEK_API_BASE, env_vars::DEEPSEEK_BASE_URL),
            Provider::Perplexity => (urls::PERPLEXITY_API_BASE, env_vars::PERPLEXITY_BASE_URL),
            _ => (urls::OPENAI_API_BASE, env_vars::OPENAI_BASE_URL),
        };

        Self {
            provider,
            api_key,
            http_client: HttpClient::new(),
            base_url: override_base_url(default_base, base_url, Some(env_override)),
            model,
        }
    }

    fn build_payload(&self, request: &CompletionRequest) -> Value {
        let model = if request.model.trim().is_empty() {
            &self.model
        } else {
            &request.model
        };

        let mut payload = json!({
            "model": model,
            "messages": [{
                "role": message_roles::USER,
                "content": request.prompt,
            }],
        });

        if let Some(max_tokens) = request.max_tokens
            && let Some(map) = payload.as_object_mut()
        {
            map.insert("max_tokens".to_string(), json!(max_tokens));
        }

        payload
    }

    fn parse_response(&self, response_json: Value) -> Result<CompletionResponse, LLMError> {
        let label = self.provider.label();
        let choices = response_json
            .get("choices")
            .and_then(|value| value.as_array())
            .ok_or_else(|| {
                LLMError::Provider(error_display::format_llm_error(
                    label,
                    "Invalid response format: missing choices",
                ))
            })?;

        let choice = choices.first().ok_or_else(|| {
            LLMError::Provider(error_display::format_llm_error(
                label,
                "No choices in response",
            ))
        })?;

        let content = choice
            .get("message")
            .and_then(|message| message.get("content"))
            .and_then(|value| value.as_str())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                LLMError::Provider(error_display::format_llm_error(
                    label,
                    "Invalid response format: missing message content",
                ))
            })?;

        Ok(CompletionResponse {
            content: content.to_string(),
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAIChatProvider {
    fn name(&self) -> &str {
        self.provider.as_str()
    }

    async fn generate(&self, request: CompletionRequest) -> Result<CompletionResponse, LLMError> {
        self.validate_request(&request)?;
        let label = self.provider.label();

        let payload = self.build_payload(&request);
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| LLMError::Network(error_display::format_network_error(label, &err)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(LLMError::Authentication(error_display::format_llm_error(
                    label,
                    &format!(
                        "Authentication failed (check {})",
                        self.provider.default_api_key_env()
                    ),
                )));
            }

            if status.as_u16() == 429 || error_text.contains("quota") {
                return Err(LLMError::RateLimit);
            }

            return Err(LLMError::Provider(error_display::format_llm_error(
                label,
                &format!("HTTP {status}: {error_text}"),
            )));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|err| LLMError::Provider(error_display::format_parse_error(label, &err)))?;

        self.parse_response(response_json)
    }

    fn supported_models(&self) -> Vec<String> {
        match self.provider {
            Provider::DeepSeek => vec![models::DEEPSEEK_CHAT.to_string()],
            Provider::Perplexity => vec![models::SONAR_REASONING_PRO.to_string()],
            _ => vec![models::GPT_5_1.to_string(), models::GPT_4O.to_string()],
        }
    }
}
