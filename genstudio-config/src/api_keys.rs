//! API key resolution for provider requests.
//!
//! Keys are looked up fresh on every call, environment first and the
//! persisted settings store second, so edits in either place take effect on
//! the next task without a restart. Key values are never logged.

use std::env;

use anyhow::Result;

use crate::models::Provider;
use crate::settings::SettingsStore;

/// Load environment variables from a `.env` file in the working directory.
///
/// A missing file is not an error; a malformed one is logged and skipped so
/// startup never fails on it.
pub fn load_dotenv() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!("loaded environment variables from {}", path.display());
            Ok(())
        }
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => {
            tracing::warn!("failed to load .env file: {err}");
            Ok(())
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

fn env_api_key(provider: Provider) -> Option<String> {
    if let Ok(key) = env::var(provider.default_api_key_env())
        && let Some(key) = non_empty(key)
    {
        return Some(key);
    }

    // GOOGLE_API_KEY predates the Gemini-specific variable; accept both.
    if provider == Provider::Gemini
        && let Ok(key) = env::var("GOOGLE_API_KEY")
        && let Some(key) = non_empty(key)
    {
        return Some(key);
    }

    None
}

/// Resolve the API key for a provider: environment variable first, then the
/// persisted settings store. Returns `None` when neither source has a value.
pub fn resolve_api_key(provider: Provider, store: Option<&SettingsStore>) -> Option<String> {
    if let Some(key) = env_api_key(provider) {
        return Some(key);
    }

    if let Some(store) = store {
        match store.api_key(provider.as_str()) {
            Ok(Some(key)) => return Some(key),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(provider = provider.as_str(), "settings store read failed: {err}");
            }
        }
    }

    None
}

/// Resolve against the default settings store location.
pub fn resolve_api_key_default(provider: Provider) -> Option<String> {
    let store = SettingsStore::default_location();
    resolve_api_key(provider, store.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn store_with(provider: &str, key: &str) -> (TempDir, SettingsStore) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keys.toml");
        fs::write(&path, format!("[api_keys]\n{provider} = \"{key}\"\n")).unwrap();
        (dir, SettingsStore::at_path(path))
    }

    #[test]
    #[serial]
    fn env_var_wins_over_store() {
        unsafe {
            env::set_var("DEEPSEEK_API_KEY", "env-key");
        }
        let (_dir, store) = store_with("deepseek", "store-key");

        let key = resolve_api_key(Provider::DeepSeek, Some(&store));
        assert_eq!(key.as_deref(), Some("env-key"));

        unsafe {
            env::remove_var("DEEPSEEK_API_KEY");
        }
    }

    #[test]
    #[serial]
    fn falls_back_to_settings_store() {
        unsafe {
            env::remove_var("PERPLEXITY_API_KEY");
        }
        let (_dir, store) = store_with("perplexity", "store-key");

        let key = resolve_api_key(Provider::Perplexity, Some(&store));
        assert_eq!(key.as_deref(), Some("store-key"));
    }

    #[test]
    #[serial]
    fn google_api_key_accepted_for_gemini() {
        unsafe {
            env::remove_var("GEMINI_API_KEY");
            env::set_var("GOOGLE_API_KEY", "legacy-google-key");
        }

        let key = resolve_api_key(Provider::Gemini, None);
        assert_eq!(key.as_deref(), Some("legacy-google-key"));

        unsafe {
            env::remove_var("GOOGLE_API_KEY");
        }
    }

    #[test]
    #[serial]
    fn empty_env_value_is_ignored() {
        unsafe {
            env::set_var("OPENAI_API_KEY", "   ");
        }
        let (_dir, store) = store_with("openai", "store-key");

        let key = resolve_api_key(Provider::OpenAI, Some(&store));
        assert_eq!(key.as_deref(), Some("store-key"));

        unsafe {
            env::remove_var("OPENAI_API_KEY");
        }
    }

    #[test]
    #[serial]
    fn missing_everywhere_is_none() {
        unsafe {
            env::remove_var("ANTHROPIC_API_KEY");
        }
        assert_eq!(resolve_api_key(Provider::Anthropic, None), None);
    }
}
