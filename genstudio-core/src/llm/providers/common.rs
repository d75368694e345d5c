//! Helpers shared across provider implementations.

/// Resolve the base URL for a provider: explicit override first, then an
/// environment variable, then the built-in default.
pub fn override_base_url(
    default_base_url: &str,
    base_url: Option<String>,
    env_var_name: Option<&str>,
) -> String {
    if let Some(url) = base_url {
        let trimmed = url.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    if let Some(var_name) = env_var_name
        && let Ok(value) = std::env::var(var_name)
    {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    default_base_url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn explicit_override_wins() {
        let url = override_base_url("https://default", Some("https://custom".into()), None);
        assert_eq!(url, "https://custom");
    }

    #[test]
    fn blank_override_falls_through() {
        let url = override_base_url("https://default", Some("   ".into()), None);
        assert_eq!(url, "https://default");
    }

    #[test]
    #[serial]
    fn env_var_used_when_no_override() {
        unsafe {
            std::env::set_var("TEST_PROVIDER_BASE_URL", "https://from-env");
        }
        let url = override_base_url("https://default", None, Some("TEST_PROVIDER_BASE_URL"));
        assert_eq!(url, "https://from-env");
        unsafe {
            std::env::remove_var("TEST_PROVIDER_BASE_URL");
        }
    }
}
