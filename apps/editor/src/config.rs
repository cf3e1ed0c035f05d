use anyhow::{Context, Result};
use uuid::Uuid;

/// Editor configuration loaded from environment variables.
/// Required variables fail loading with a named error.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: String,
    pub resume_id: Uuid,
    pub profile_id: Uuid,
    pub request_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: require_env("API_BASE_URL")?,
            api_token: require_env("API_TOKEN")?,
            resume_id: require_env("RESUME_ID")?
                .parse::<Uuid>()
                .context("RESUME_ID must be a valid UUID")?,
            profile_id: require_env("PROFILE_ID")?
                .parse::<Uuid>()
                .context("PROFILE_ID must be a valid UUID")?,
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
