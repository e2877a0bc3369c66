use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if a numeric variable cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    /// When set, profiles are persisted to Postgres; otherwise the in-memory gateway is used.
    pub database_url: Option<String>,
    /// When set, session tokens live in Redis; otherwise in process memory.
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub session_ttl_secs: u64,
    pub profile_save_latency: Duration,
    pub resume_upload_latency: Duration,
    pub job_search_latency: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            redis_url: optional_env("REDIS_URL"),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            session_ttl_secs: parse_env("SESSION_TTL_SECS", 86_400)?,
            profile_save_latency: Duration::from_millis(parse_env(
                "PROFILE_SAVE_LATENCY_MS",
                1500,
            )?),
            resume_upload_latency: Duration::from_millis(parse_env(
                "RESUME_UPLOAD_LATENCY_MS",
                1000,
            )?),
            job_search_latency: Duration::from_millis(parse_env("JOB_SEARCH_LATENCY_MS", 800)?),
        })
    }

    /// Zero-latency, storage-free configuration for router tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            database_url: None,
            redis_url: None,
            port: 0,
            rust_log: "debug".to_string(),
            session_ttl_secs: 60,
            profile_save_latency: Duration::ZERO,
            resume_upload_latency: Duration::ZERO,
            job_search_latency: Duration::ZERO,
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: u64 = parse_env("CAREERBRIDGE_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("CAREERBRIDGE_TEST_BAD_PORT", "eighty");
        let result: Result<u16> = parse_env("CAREERBRIDGE_TEST_BAD_PORT", 8080);
        assert!(result.is_err());
        std::env::remove_var("CAREERBRIDGE_TEST_BAD_PORT");
    }
}
