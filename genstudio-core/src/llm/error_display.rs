//! Error message formatting for provider failures.
//!
//! The GUI console owns colors and styling, so these render plain text.

/// Format an LLM error for display: `"{provider}: {message}"`.
pub fn format_llm_error(provider: &str, error: &str) -> String {
    format!("{provider}: {error}")
}

/// Convenience wrapper for the common "Network error: {}" pattern.
pub fn format_network_error(provider: &str, error: &impl std::fmt::Display) -> String {
    format_llm_error(provider, &format!("Network error: {error}"))
}

/// Convenience wrapper for the common "Parse error: {}" pattern.
pub fn format_parse_error(provider: &str, error: &impl std::fmt::Display) -> String {
    format_llm_error(provider, &format!("Parse error: {error}"))
}
