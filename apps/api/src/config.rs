use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::recipes::detail_cache::DEFAULT_TTL_SECS;

pub const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com";

/// Application configuration loaded from environment variables.
/// The provider credential is optional at boot so `/api/v1/env-check` can report it;
/// every provider call fails with a config error while it is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub spoonacular_api_key: Option<String>,
    pub spoonacular_base_url: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub detail_cache_ttl: chrono::Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            spoonacular_api_key: std::env::var("SPOONACULAR_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            spoonacular_base_url: std::env::var("SPOONACULAR_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            request_timeout_secs: env_or("SPOONACULAR_TIMEOUT_SECS", 10)?,
            max_retries: env_or("SPOONACULAR_MAX_RETRIES", 3)?,
            backoff_base_ms: env_or("SPOONACULAR_BACKOFF_MS", 1000)?,
            detail_cache_ttl: cache_ttl(env_or("RECIPE_CACHE_TTL_SECS", DEFAULT_TTL_SECS)?)
                .context("Environment variable 'RECIPE_CACHE_TTL_SECS' is out of range")?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn cache_ttl(secs: i64) -> Result<chrono::Duration> {
    if secs < 0 {
        return Err(anyhow!("cache TTL cannot be negative, got {secs}"));
    }
    chrono::Duration::try_seconds(secs)
        .ok_or_else(|| anyhow!("cache TTL of {secs} seconds does not fit a duration"))
}
