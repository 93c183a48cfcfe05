/// Spoonacular client: the single point of entry for all provider calls.
///
/// No other module may talk to the recipe provider directly. Every request
/// goes through `SpoonacularClient::get_json`, which owns credential checks,
/// failure classification and retry/backoff.
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::models::recipe::{IngredientQuery, RecipeDetail, RecipeStub};

pub mod transport;
mod wire;

use transport::{ProviderRequest, RawResponse, ReqwestTransport, Transport, TransportError};
use wire::{DetailPayload, SearchPayload};

const FIND_BY_INGREDIENTS_PATH: &str = "/recipes/findByIngredients";
pub const MIN_RESULTS: u32 = 1;
pub const MAX_RESULTS: u32 = 10;
const ERROR_SNIPPET_CHARS: usize = 300;
/// Longest `Retry-After` wait honoured for a single 429.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum RecipeApiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Network error after {attempts} attempts: {message}")]
    Network { attempts: u32, message: String },

    #[error("Rate limited after {attempts} attempts: {message}")]
    RateLimitExceeded { attempts: u32, message: String },

    #[error("Provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Could not decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Coarse grouping callers use to decide between retrying later and rejecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadInput,
    Upstream,
    Config,
}

impl RecipeApiError {
    pub fn class(&self) -> ErrorClass {
        match self {
            RecipeApiError::Config(_) => ErrorClass::Config,
            RecipeApiError::InvalidQuery(_) => ErrorClass::BadInput,
            RecipeApiError::Network { .. }
            | RecipeApiError::RateLimitExceeded { .. }
            | RecipeApiError::Provider { .. }
            | RecipeApiError::Decode(_) => ErrorClass::Upstream,
        }
    }
}

/// Retry knobs. `max_attempts` counts total attempts per failure class.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(1000),
        }
    }
}

/// Wait before retrying after the `attempt`-th failure (1-indexed): `base * 2^(attempt-1)`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    base.saturating_mul(1u32 << exponent)
}

/// Per-class attempt counters. A 429 streak does not eat into the 5xx budget.
#[derive(Debug, Default)]
struct AttemptCounters {
    rate_limited: u32,
    server_error: u32,
    network: u32,
}

#[derive(Clone)]
pub struct SpoonacularClient {
    transport: Arc<dyn Transport>,
    api_key: Option<String>,
    base_url: String,
    retry: RetryPolicy,
}

impl SpoonacularClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        api_key: Option<String>,
        base_url: &str,
        retry: RetryPolicy,
    ) -> Result<Self, RecipeApiError> {
        let base_url = base_url.trim();
        if !base_url.starts_with("https://") || base_url.len() <= "https://".len() {
            return Err(RecipeApiError::Config(format!(
                "Invalid base URL '{base_url}'. Must start with 'https://'."
            )));
        }

        Ok(Self {
            transport,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy {
                max_attempts: retry.max_attempts.max(1),
                ..retry
            },
        })
    }

    /// Builds the production client on top of `reqwest`.
    pub fn from_config(config: &Config) -> Result<Self, RecipeApiError> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.request_timeout_secs))
            .map_err(|e| RecipeApiError::Config(format!("Failed to build HTTP client: {e}")))?;

        Self::new(
            Arc::new(transport),
            config.spoonacular_api_key.clone(),
            &config.spoonacular_base_url,
            RetryPolicy {
                max_attempts: config.max_retries,
                backoff_base: Duration::from_millis(config.backoff_base_ms),
            },
        )
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Ingredient search. Provider order is relevance order and is kept as-is.
    pub async fn search(&self, query: &IngredientQuery) -> Result<Vec<RecipeStub>, RecipeApiError> {
        if query.ingredients.is_empty() {
            return Err(RecipeApiError::InvalidQuery(
                "at least one ingredient is required".to_string(),
            ));
        }

        let count = query.count.clamp(MIN_RESULTS, MAX_RESULTS);
        let params = vec![
            ("ingredients", query.ingredients.join(",")),
            ("number", count.to_string()),
            ("ranking", query.ranking.provider_value().to_string()),
            ("ignorePantry", query.ignore_pantry.to_string()),
        ];

        let payload: SearchPayload = self.get_json(FIND_BY_INGREDIENTS_PATH, params).await?;
        let stubs = wire::normalize_search(payload, count as usize);

        debug!(
            "Ingredient search returned {} recipes for {} ingredients",
            stubs.len(),
            query.ingredients.len()
        );

        Ok(stubs)
    }

    /// Fetches `/recipes/{id}/information`, stamping the result with `fetched_at`.
    pub async fn fetch_detail(
        &self,
        id: u64,
        fetched_at: DateTime<Utc>,
    ) -> Result<RecipeDetail, RecipeApiError> {
        let path = format!("/recipes/{id}/information");
        let params = vec![("includeNutrition", "false".to_string())];

        let payload: DetailPayload = self.get_json(&path, params).await?;
        Ok(wire::normalize_detail(id, payload, fetched_at))
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET with credential check, failure classification and retry.
    /// Retries 429, 5xx and transport failures with exponential backoff;
    /// any other non-2xx fails on the spot.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Vec<(&str, String)>,
    ) -> Result<T, RecipeApiError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            RecipeApiError::Config(
                "SPOONACULAR_API_KEY is missing. Set it in the environment or .env file."
                    .to_string(),
            )
        })?;

        let mut query: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        query.push(("apiKey".to_string(), api_key.to_string()));

        let request = ProviderRequest {
            url: self.build_url(path),
            query,
        };

        let max = self.retry.max_attempts;
        let mut attempts = AttemptCounters::default();

        loop {
            let delay = match self.transport.get(&request).await {
                Ok(response) if response.is_success() => {
                    debug!("Provider call to {} succeeded", path);
                    return serde_json::from_str(&response.body).map_err(RecipeApiError::Decode);
                }
                Ok(response) if response.status == 429 => {
                    attempts.rate_limited += 1;
                    let n = attempts.rate_limited;
                    if n >= max {
                        error!("Provider rate limit on {} persisted after {} attempts", path, n);
                        return Err(RecipeApiError::RateLimitExceeded {
                            attempts: n,
                            message: extract_error_message(&response),
                        });
                    }
                    response
                        .retry_after_hint()
                        .map(|hint| hint.min(MAX_RETRY_AFTER))
                        .unwrap_or_else(|| backoff_delay(self.retry.backoff_base, n))
                }
                Ok(response) if response.is_server_error() => {
                    attempts.server_error += 1;
                    let n = attempts.server_error;
                    if n >= max {
                        error!(
                            "Provider returned {} on {} after {} attempts",
                            response.status, path, n
                        );
                        return Err(RecipeApiError::Provider {
                            status: response.status,
                            message: extract_error_message(&response),
                        });
                    }
                    backoff_delay(self.retry.backoff_base, n)
                }
                Ok(response) => {
                    return Err(RecipeApiError::Provider {
                        status: response.status,
                        message: extract_error_message(&response),
                    });
                }
                Err(e) => {
                    attempts.network += 1;
                    let n = attempts.network;
                    if n >= max {
                        error!("Provider request to {} failed after {} attempts: {}", path, n, e);
                        return Err(network_error(n, &e));
                    }
                    backoff_delay(self.retry.backoff_base, n)
                }
            };

            warn!(
                "Provider call to {} failed (429s: {}, 5xx: {}, network: {}), retrying after {}ms...",
                path,
                attempts.rate_limited,
                attempts.server_error,
                attempts.network,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn network_error(attempts: u32, e: &TransportError) -> RecipeApiError {
    RecipeApiError::Network {
        attempts,
        message: e.to_string(),
    }
}

/// Best-effort human-readable message from an error response.
///
/// Checks `message`, `error`, `status_message` string fields in that order,
/// then a JSON string (or list of strings) body, then a raw-text snippet,
/// and finally the bare status code.
pub fn extract_error_message(response: &RawResponse) -> String {
    if let Ok(data) = serde_json::from_str::<Value>(&response.body) {
        match &data {
            Value::Object(map) => {
                for key in ["message", "error", "status_message"] {
                    if let Some(Value::String(s)) = map.get(key) {
                        return s.clone();
                    }
                }
            }
            Value::String(s) => return truncate_chars(s, ERROR_SNIPPET_CHARS),
            Value::Array(items) => {
                if let Some(Value::String(s)) = items.first() {
                    return truncate_chars(s, ERROR_SNIPPET_CHARS);
                }
            }
            _ => {}
        }
    }

    let snippet = truncate_chars(&response.body, ERROR_SNIPPET_CHARS).replace('\n', " ");
    let snippet = snippet.trim();
    if snippet.is_empty() {
        format!("HTTP {}", response.status)
    } else {
        snippet.to_string()
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
