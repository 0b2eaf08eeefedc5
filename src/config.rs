use anyhow::{bail, Context, Result};
use std::env;

/// Runtime configuration, read once at startup.
///
/// A `.env` file is honored when present (loaded by the binaries before
/// this is called); otherwise plain process environment variables apply.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fred_api_key: String,
    pub supabase_url: String,
    pub supabase_key: String,
    pub ntfy_topic: String,
    /// Optional: the AI summary endpoint reports itself unconfigured without it.
    pub gemini_api_key: Option<String>,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let fred_api_key = require("FRED_API_KEY")?;

        let supabase_url = require("SUPABASE_URL")?;
        if !supabase_url.starts_with("http://") && !supabase_url.starts_with("https://") {
            bail!("SUPABASE_URL must start with http:// or https://");
        }
        let supabase_url = supabase_url.trim_end_matches('/').to_string();

        let supabase_key = require("SUPABASE_KEY")?;
        let ntfy_topic = require("NTFY_TOPIC")?;

        let gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|v| !v.is_empty());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        Ok(Self {
            fred_api_key,
            supabase_url,
            supabase_key,
            ntfy_topic,
            gemini_api_key,
            bind_addr,
        })
    }
}

fn require(name: &str) -> Result<String> {
    let value =
        env::var(name).with_context(|| format!("Missing environment variable: {}", name))?;
    if value.is_empty() {
        bail!("Environment variable {} is set but empty", name);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: from_env reads process-global state, so the scenarios run
    // sequentially inside one function.
    #[test]
    fn test_from_env() {
        env::set_var("FRED_API_KEY", "fred-key");
        env::set_var("SUPABASE_URL", "https://example.supabase.co/");
        env::set_var("SUPABASE_KEY", "service-key");
        env::set_var("NTFY_TOPIC", "macro-test-topic");
        env::remove_var("GEMINI_API_KEY");
        env::remove_var("BIND_ADDR");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.fred_api_key, "fred-key");
        // Trailing slash is trimmed so URL building stays simple
        assert_eq!(config.supabase_url, "https://example.supabase.co");
        assert_eq!(config.ntfy_topic, "macro-test-topic");
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.bind_addr, "0.0.0.0:8000");

        env::set_var("SUPABASE_URL", "example.supabase.co");
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("SUPABASE_URL"));

        env::set_var("SUPABASE_URL", "https://example.supabase.co");
        env::remove_var("NTFY_TOPIC");
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("NTFY_TOPIC"));
    }
}
