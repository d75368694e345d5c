//! Gemini generateContent adapter.

use async_trait::async_trait;
use genstudio_config::constants::{env_vars, message_roles, models, urls};
use reqwest::Client as HttpClient;
use serde_json::{Value, json};

use super::common::override_base_url;
use crate::llm::error_display;
use crate::llm::provider::{CompletionRequest, CompletionResponse, LLMError, LLMProvider};

const PROVIDER_NAME: &str = "Gemini";
const PROVIDER_KEY: &str = "gemini";

pub struct GeminiProvider {
    api_key: String,
    http_client: HttpClient,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            http_client: HttpClient::new(),
            base_url: override_base_url(
                urls::GEMINI_API_BASE,
                base_url,
                Some(env_vars::GEMINI_BASE_URL),
            ),
            model,
        }
    }

    fn build_payload(request: &CompletionRequest) -> Value {
        json!({
            "contents": [{
                "role": message_roles::USER,
                "parts": [{"text": request.prompt}],
            }],
        })
    }

    fn parse_response(response_json: Value) -> Result<CompletionResponse, LLMError> {
        let candidates = response_json
            .get("candidates")
            .and_then(|value| value.as_array())
            .ok_or_else(|| {
                LLMError::Provider(error_display::format_llm_error(
                    PROVIDER_NAME,
                    "Invalid response format: missing candidates",
                ))
            })?;

        let candidate = candidates.first().ok_or_else(|| {
            LLMError::Provider(error_display::format_llm_error(
                PROVIDER_NAME,
                "No candidates in response",
            ))
        })?;

        let text = candidate
            .get("content")
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                LLMError::Provider(error_display::format_llm_error(
                    PROVIDER_NAME,
                    "Invalid response format: candidate has no text parts",
                ))
            })?;

        Ok(CompletionResponse { content: text })
    }

    fn map_http_error(status: reqwest::StatusCode, error_text: String) -> LLMError {
        match status.as_u16() {
            401 | 403 => LLMError::Authentication(error_display::format_llm_error(
                PROVIDER_NAME,
                "Authentication failed (check GEMINI_API_KEY or GOOGLE_API_KEY)",
            )),
            429 => LLMError::RateLimit,
            400 => LLMError::InvalidRequest(error_display::format_llm_error(
                PROVIDER_NAME,
                &format!("HTTP {status}: {error_text}"),
            )),
            _ if error_text.contains("RESOURCE_EXHAUSTED") || error_text.contains("quota") => {
                LLMError::RateLimit
            }
            _ => LLMError::Provider(error_display::format_llm_error(
                PROVIDER_NAME,
                &format!("HTTP {status}: {error_text}"),
            )),
        }
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER_KEY
    }

    async fn generate(&self, request: CompletionRequest) -> Result<CompletionResponse, LLMError> {
        self.validate_request(&request)?;

        let model = if request.model.trim().is_empty() {
            &self.model
        } else {
            &request.model
        };
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        );
        let payload = Self::build_payload(&request);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                LLMError::Network(error_display::format_network_error(PROVIDER_NAME, &err))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::map_http_error(status, error_text));
        }

        let response_json: Value = response.json().await.map_err(|err| {
            LLMError::Provider(error_display::format_parse_error(PROVIDER_NAME, &err))
        })?;

        Self::parse_response(response_json)
    }

    fn supported_models(&self) -> Vec<String> {
        vec![
            models::GEMINI_2_5_FLASH.to_string(),
            models::GEMINI_3_PRO.to_string(),
        ]
    }
}
