//! Provider and model preset registry.
//!
//! The presets mirror the model picker in the editor toolbar: each entry maps
//! a human-readable label to a provider family and a wire model identifier.
//! Adding a model is a registry edit, not a code change in the provider layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{models, urls};

/// Supported provider families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    OpenAI,
    Anthropic,
    DeepSeek,
    Perplexity,
}

impl Provider {
    pub fn all() -> &'static [Provider] {
        &[
            Provider::Gemini,
            Provider::OpenAI,
            Provider::Anthropic,
            Provider::DeepSeek,
            Provider::Perplexity,
        ]
    }

    /// Canonical lowercase identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
            Provider::DeepSeek => "deepseek",
            Provider::Perplexity => "perplexity",
        }
    }

    /// Display label used in UI surfaces and error messages
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::OpenAI => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::DeepSeek => "DeepSeek",
            Provider::Perplexity => "Perplexity",
        }
    }

    /// Environment variable consulted first when resolving an API key
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::DeepSeek => "DEEPSEEK_API_KEY",
            Provider::Perplexity => "PERPLEXITY_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAI),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "deepseek" => Ok(Provider::DeepSeek),
            "perplexity" => Ok(Provider::Perplexity),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// A selectable model entry: label shown to the user, provider family,
/// wire model id, and an optional endpoint override for providers that
/// reuse another family's wire format on a different host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPreset {
    pub label: &'static str,
    pub provider: Provider,
    pub model: &'static str,
    pub base_url: Option<&'static str>,
}

pub const MODEL_PRESETS: &[ModelPreset] = &[
    ModelPreset {
        label: "Google: Gemini 2.5 Flash",
        provider: Provider::Gemini,
        model: models::GEMINI_2_5_FLASH,
        base_url: None,
    },
    ModelPreset {
        label: "Google: Gemini 3 Pro",
        provider: Provider::Gemini,
        model: models::GEMINI_3_PRO,
        base_url: None,
    },
    ModelPreset {
        label: "OpenAI: GPT-5.1",
        provider: Provider::OpenAI,
        model: models::GPT_5_1,
        base_url: None,
    },
    ModelPreset {
        label: "OpenAI: GPT-4o",
        provider: Provider::OpenAI,
        model: models::GPT_4O,
        base_url: None,
    },
    ModelPreset {
        label: "Anthropic: Claude 3.5 Sonnet",
        provider: Provider::Anthropic,
        model: models::CLAUDE_3_5_SONNET,
        base_url: None,
    },
    ModelPreset {
        label: "DeepSeek: V3",
        provider: Provider::DeepSeek,
        model: models::DEEPSEEK_CHAT,
        base_url: Some(urls::DEEPSEEK_API_BASE),
    },
    ModelPreset {
        label: "Perplexity: Sonar Large",
        provider: Provider::Perplexity,
        model: models::SONAR_REASONING_PRO,
        base_url: Some(urls::PERPLEXITY_API_BASE),
    },
];

/// Look up a preset by its UI label.
pub fn find_preset(label: &str) -> Option<&'static ModelPreset> {
    MODEL_PRESETS.iter().find(|preset| preset.label == label)
}

/// Look up a preset by wire model id.
pub fn find_preset_for_model(model: &str) -> Option<&'static ModelPreset> {
    MODEL_PRESETS.iter().find(|preset| preset.model == model)
}
