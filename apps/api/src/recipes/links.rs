use tracing::warn;

use crate::models::recipe::{RecipeDetail, RecipeStub};
use crate::recipes::detail_cache::RecipeDetailCache;

const RECIPE_PAGE_BASE: &str = "https://spoonacular.com/recipes";

/// Canonical link for a recipe. Always non-empty.
///
/// Prefers the detail's `source_url`; otherwise points at the provider's own
/// recipe page, `https://spoonacular.com/recipes/<slug>-<id>`.
pub fn resolve_link(stub: &RecipeStub, detail: Option<&RecipeDetail>) -> String {
    detail
        .and_then(|d| d.source_url.as_deref())
        .filter(|url| !url.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback_link(stub))
}

pub fn fallback_link(stub: &RecipeStub) -> String {
    format!("{RECIPE_PAGE_BASE}/{}-{}", slugify_title(&stub.title), stub.id)
}

/// Lower-cases, swaps spaces for hyphens, then percent-encodes.
pub fn slugify_title(title: &str) -> String {
    let title = title.trim();
    let title = if title.is_empty() { "recipe" } else { title };
    urlencoding::encode(&title.to_lowercase().replace(' ', "-")).into_owned()
}

/// Looks the detail up through the cache and resolves the link from it.
/// A failed lookup is logged and falls back to the synthesized link.
pub async fn resolve_with_cache(
    cache: &RecipeDetailCache,
    stub: &RecipeStub,
) -> (String, Option<RecipeDetail>) {
    let detail = match cache.get_detail(stub.id).await {
        Ok(detail) => Some(detail),
        Err(e) => {
            warn!("Failed to fetch detail for recipe {}: {e}", stub.id);
            None
        }
    };

    (resolve_link(stub, detail.as_ref()), detail)
}
