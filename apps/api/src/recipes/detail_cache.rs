//! Recipe detail cache: memoizes `/information` lookups with a TTL.
//!
//! Entries are replaced lazily on the first access after they go stale; there
//! is no background sweep and no capacity limit. Two concurrent misses for the
//! same id may both hit the provider; whichever finishes last wins the slot.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::models::recipe::RecipeDetail;
use crate::recipe_client::{RecipeApiError, SpoonacularClient};

pub const DEFAULT_TTL_SECS: i64 = 60 * 60 * 12;

/// Time source for cache freshness. Injected so tests can move time by hand.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    detail: RecipeDetail,
    stored_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.stored_at < ttl
    }
}

pub struct RecipeDetailCache {
    client: SpoonacularClient,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    /// Sharded map: readers of different ids never contend on one lock.
    entries: DashMap<u64, CacheEntry>,
}

impl RecipeDetailCache {
    pub fn new(client: SpoonacularClient, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            client,
            clock,
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn with_system_clock(client: SpoonacularClient, ttl: Duration) -> Self {
        Self::new(client, Arc::new(SystemClock), ttl)
    }

    /// Returns the cached detail while fresh; otherwise fetches, stores and returns it.
    /// Shard guards are never held across the provider call.
    pub async fn get_detail(&self, id: u64) -> Result<RecipeDetail, RecipeApiError> {
        let now = self.clock.now();

        let cached = self
            .entries
            .get(&id)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.detail.clone());

        if let Some(detail) = cached {
            debug!("Recipe detail cache hit for {id}");
            return Ok(detail);
        }

        debug!("Recipe detail cache miss for {id}, fetching");
        let detail = self.client.fetch_detail(id, now).await?;

        let stored_at = self.clock.now();
        self.entries.insert(
            id,
            CacheEntry {
                detail: detail.clone(),
                stored_at,
            },
        );

        Ok(detail)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
