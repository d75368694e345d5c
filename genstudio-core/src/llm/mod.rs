//! LLM provider layer: one trait, three wire families, a factory keyed by
//! the model registry.

pub mod error_display;
pub mod factory;
pub mod provider;
pub mod providers;

pub use factory::{ProviderFactory, create_provider};
pub use provider::{CompletionRequest, CompletionResponse, LLMError, LLMProvider};
