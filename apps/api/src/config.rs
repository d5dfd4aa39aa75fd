use anyhow::{Context, Result};
use std::str::FromStr;

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_PRIMARY_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_FALLBACK_MODEL: &str = "gemini-1.5-flash";

/// Application configuration loaded from environment variables.
/// Startup fails if `GOOGLE_API_KEY` is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub gemini_api_base: String,
    pub primary_model: String,
    pub fallback_model: String,
    pub fallback_max_retries: u32,
    pub fallback_backoff_ms: u64,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: require_env("GOOGLE_API_KEY")?,
            gemini_api_base: env_or("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
            primary_model: env_or("PRIMARY_MODEL", DEFAULT_PRIMARY_MODEL),
            fallback_model: env_or("FALLBACK_MODEL", DEFAULT_FALLBACK_MODEL),
            fallback_max_retries: parse_env("FALLBACK_MAX_RETRIES", 1)?,
            fallback_backoff_ms: parse_env("FALLBACK_BACKOFF_MS", 1500)?,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 120)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u32 = parse_env("TALENTFLOW_TEST_UNSET_NUMBER", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("TALENTFLOW_TEST_BAD_NUMBER", "lots");
        let result: Result<u16> = parse_env("TALENTFLOW_TEST_BAD_NUMBER", 8080);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("TALENTFLOW_TEST_BAD_NUMBER"));
    }

    #[test]
    fn test_require_env_rejects_blank_value() {
        std::env::set_var("TALENTFLOW_TEST_BLANK_KEY", "   ");
        assert!(require_env("TALENTFLOW_TEST_BLANK_KEY").is_err());
    }

    #[test]
    fn test_require_env_reports_missing_key_name() {
        let message = require_env("TALENTFLOW_TEST_MISSING_KEY")
            .unwrap_err()
            .to_string();
        assert!(message.contains("TALENTFLOW_TEST_MISSING_KEY"));
    }
}
