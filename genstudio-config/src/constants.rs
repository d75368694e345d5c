//! Centralized constants to avoid hardcoding strings throughout the codebase.

/// Provider API endpoints
pub mod urls {
    pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
    pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
    pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";
    pub const DEEPSEEK_API_BASE: &str = "https://api.deepseek.com";
    pub const PERPLEXITY_API_BASE: &str = "https://api.perplexity.ai";
}

/// Environment variable names for overriding provider base URLs
pub mod env_vars {
    pub const GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
    pub const ANTHROPIC_BASE_URL: &str = "ANTHROPIC_BASE_URL";
    pub const DEEPSEEK_BASE_URL: &str = "DEEPSEEK_BASE_URL";
    pub const PERPLEXITY_BASE_URL: &str = "PERPLEXITY_BASE_URL";
}

/// Wire model identifiers
pub mod models {
    pub const GEMINI_2_5_FLASH: &str = "gemini-2.5-flash";
    pub const GEMINI_3_PRO: &str = "gemini-3-pro-preview";
    pub const GPT_5_1: &str = "gpt-5.1";
    pub const GPT_4O: &str = "gpt-4o";
    pub const CLAUDE_3_5_SONNET: &str = "claude-3-5-sonnet-20241022";
    pub const DEEPSEEK_CHAT: &str = "deepseek-chat";
    pub const SONAR_REASONING_PRO: &str = "sonar-reasoning-pro";
}

/// Chat message role strings shared across providers
pub mod message_roles {
    pub const USER: &str = "user";
    pub const SYSTEM: &str = "system";
    pub const ASSISTANT: &str = "assistant";
}

pub mod defaults {
    use std::time::Duration;

    /// Hard character cutoff applied to code context before prompting.
    pub const CODE_CONTEXT_CHAR_LIMIT: usize = 20_000;
    /// Hard character cutoff applied to document source material.
    pub const DOCUMENT_CONTEXT_CHAR_LIMIT: usize = 30_000;

    /// Anthropic requires an explicit max_tokens on every request.
    pub const ANTHROPIC_DEFAULT_MAX_TOKENS: u32 = 4_096;
    /// Refactoring rewrites whole files, so it gets a larger ceiling.
    pub const REFACTOR_MAX_TOKENS: u32 = 8_192;

    /// Default timeout for external commands, git included.
    pub const PROCESS_TIMEOUT: Duration = Duration::from_secs(30);
    pub const GIT_DEFAULT_REMOTE: &str = "origin";
    /// Branch sentinel when `git branch --show-current` prints nothing
    /// (detached HEAD or a repository without commits).
    pub const UNKNOWN_BRANCH: &str = "unknown";
    pub const GIT_LOG_DEFAULT_COUNT: usize = 10;

    /// Capture cap per stream for child process output.
    pub const PROCESS_CAPTURE_LIMIT: usize = 256 * 1024;
}
