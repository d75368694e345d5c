mod anthropic;
mod common;
mod gemini;
mod openai;

pub use anthropic::AnthropicProvider;
pub use common::override_base_url;
pub use gemini::GeminiProvider;
pub use openai::OpenAIChatProvider;
