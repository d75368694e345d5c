//! Provider construction from model presets.
//!
//! The registry is data (`MODEL_PRESETS`); the only per-family branching
//! lives here, at construction time. The dispatcher takes a
//! [`ProviderFactory`] so tests can substitute canned providers.

use genstudio_config::models::{ModelPreset, Provider};

use super::provider::LLMProvider;
use super::providers::{AnthropicProvider, GeminiProvider, OpenAIChatProvider};

/// Factory signature injected into the dispatcher.
pub type ProviderFactory =
    Box<dyn Fn(&ModelPreset, String) -> Box<dyn LLMProvider> + Send + Sync>;

/// Build the provider for a preset with the resolved API key.
pub fn create_provider(preset: &ModelPreset, api_key: String) -> Box<dyn LLMProvider> {
    let model = preset.model.to_string();
    let base_url = preset.base_url.map(str::to_string);

    match preset.provider {
        Provider::Gemini => Box::new(GeminiProvider::new(api_key, model, base_url)),
        Provider::Anthropic => Box::new(AnthropicProvider::new(api_key, model, base_url)),
        Provider::OpenAI | Provider::DeepSeek | Provider::Perplexity => Box::new(
            OpenAIChatProvider::new(preset.provider, api_key, model, base_url),
        ),
    }
}

/// The default factory used outside of tests.
pub fn default_factory() -> ProviderFactory {
    Box::new(|preset, api_key| create_provider(preset, api_key))
}
