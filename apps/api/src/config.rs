use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::session::TurnSettings;
use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Start-up fails if a required variable is missing or a number does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_base_url: String,
    pub ai_model: String,
    pub port: u16,
    pub rust_log: String,
    pub agent_timeout_secs: u64,
    pub max_agent_steps: usize,
    pub resume_prompt_chars: usize,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            anthropic_base_url: env_or("ANTHROPIC_BASE_URL", DEFAULT_BASE_URL),
            ai_model: env_or("AI_MODEL", DEFAULT_MODEL),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
            agent_timeout_secs: parse_env("AGENT_TIMEOUT_SECS", 60)?,
            max_agent_steps: parse_env("MAX_AGENT_STEPS", 6)?,
            resume_prompt_chars: parse_env("RESUME_PROMPT_CHARS", 3000)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }

    pub fn turn_settings(&self) -> TurnSettings {
        TurnSettings {
            agent_timeout: Duration::from_secs(self.agent_timeout_secs),
            resume_prompt_chars: self.resume_prompt_chars,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_value(key, std::env::var(key).ok().as_deref(), default)
}

fn parse_value<T>(key: &str, raw: Option<&str>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            anthropic_api_key: "test-key".to_string(),
            anthropic_base_url: DEFAULT_BASE_URL.to_string(),
            ai_model: DEFAULT_MODEL.to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            agent_timeout_secs: 5,
            max_agent_steps: 6,
            resume_prompt_chars: 3000,
            max_upload_bytes: 1024 * 1024,
        }
    }
}
