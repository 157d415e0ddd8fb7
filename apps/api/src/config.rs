use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Every variable has a default; the LLM key is optional and only checked
/// when a remote parse is requested.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub resume_state_path: String,
    pub dashscope_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_or("PORT", "3001")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            resume_state_path: env_or("RESUME_STATE_PATH", "resume_state.json"),
            dashscope_api_key: optional_env("DASHSCOPE_API_KEY"),
            llm_base_url: env_or("LLM_BASE_URL", DEFAULT_BASE_URL),
            llm_model: env_or("LLM_MODEL", DEFAULT_MODEL),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}
