//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub screener: ScreenerConfig,
    pub ranking: RankingConfig,
    pub feed: FeedConfig,
    pub news: NewsConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    pub name: String,
    /// Seconds between screening sessions.
    pub session_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScreenerConfig {
    /// Catalog exchange code, e.g. "US".
    pub exchange: String,
    /// Penny-stock price ceiling in dollars.
    pub price_threshold: f64,
    /// Stop scanning once this many candidates are accumulated.
    pub max_candidates: usize,
    /// Bounded worker pool size for per-symbol quote/news fetches.
    pub fetch_concurrency: usize,
    pub api_key_env: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RankingConfig {
    /// Ranked list cap.
    pub top_n: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub enabled: bool,
    pub ws_url: String,
    pub api_key_env: String,
    /// How long each session listens to the tick stream before ranking.
    pub settle_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewsConfig {
    pub api_key_env: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub enabled: bool,
    pub model: String,
    pub api_key_env: String,
    pub max_tokens: u32,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
