//! Recipe service: the core-facing API used by the HTTP handlers.
//!
//! Pipeline: ingredient search → optional enrichment (detail cache + link
//! resolution) → optional menu scheduling.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::menu::scheduler::schedule;
use crate::models::menu::WeeklyMenu;
use crate::models::recipe::{IngredientQuery, RecipeStub, Recommendation};
use crate::recipe_client::{RecipeApiError, SpoonacularClient};
use crate::recipes::detail_cache::RecipeDetailCache;
use crate::recipes::links::{fallback_link, resolve_with_cache};

/// Longest menu a caller may ask for.
pub const MAX_MENU_DAYS: usize = 28;

#[derive(Debug, Clone, Serialize)]
pub struct MenuPlan {
    pub menu: WeeklyMenu<Recommendation>,
    pub candidate_count: usize,
}

#[derive(Clone)]
pub struct RecipeService {
    client: SpoonacularClient,
    cache: Arc<RecipeDetailCache>,
}

impl RecipeService {
    pub fn new(client: SpoonacularClient, cache: Arc<RecipeDetailCache>) -> Self {
        Self { client, cache }
    }

    pub fn from_config(config: &Config) -> Result<Self, RecipeApiError> {
        let client = SpoonacularClient::from_config(config)?;
        let cache = RecipeDetailCache::with_system_clock(
            client.clone(),
            config.detail_cache_ttl,
        );
        Ok(Self::new(client, Arc::new(cache)))
    }

    pub fn has_api_key(&self) -> bool {
        self.client.has_api_key()
    }

    /// Searches by ingredients and, when `enrich` is set, attaches each recipe's
    /// detail and canonical link. Detail failures never fail the call.
    pub async fn recommend(
        &self,
        query: &IngredientQuery,
        enrich: bool,
    ) -> Result<Vec<Recommendation>, RecipeApiError> {
        let stubs = self.client.search(query).await?;

        let mut recommendations = Vec::with_capacity(stubs.len());
        for stub in stubs {
            recommendations.push(self.enrich(stub, enrich).await);
        }

        debug!(
            "Recommended {} recipes (enriched: {enrich}, detail cache size: {})",
            recommendations.len(),
            self.cache.len()
        );

        Ok(recommendations)
    }

    /// Recommends, then schedules the results into at most `days` day slots.
    pub async fn plan_menu(
        &self,
        query: &IngredientQuery,
        days: usize,
        enrich: bool,
    ) -> Result<MenuPlan, RecipeApiError> {
        if days > MAX_MENU_DAYS {
            return Err(RecipeApiError::InvalidQuery(format!(
                "days must be between 0 and {MAX_MENU_DAYS}"
            )));
        }

        let candidates = self.recommend(query, enrich).await?;
        let menu = schedule(&candidates, days);

        Ok(MenuPlan {
            menu,
            candidate_count: candidates.len(),
        })
    }

    async fn enrich(&self, stub: RecipeStub, enrich: bool) -> Recommendation {
        if !enrich {
            return Recommendation {
                source_url: fallback_link(&stub),
                stub,
                ready_in_minutes: None,
                servings: None,
            };
        }

        let (source_url, detail) = resolve_with_cache(&self.cache, &stub).await;
        Recommendation {
            stub,
            source_url,
            ready_in_minutes: detail.as_ref().and_then(|d| d.ready_in_minutes),
            servings: detail.as_ref().and_then(|d| d.servings),
        }
    }
}
