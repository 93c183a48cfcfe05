//! Axum route handlers for the Recipes API.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::AppError;
use crate::models::recipe::{IngredientQuery, RankingMode, Recommendation};
use crate::recipe_client::{MAX_RESULTS, MIN_RESULTS};
use crate::state::AppState;

pub const DEFAULT_SUGGEST_COUNT: u32 = 5;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    #[serde(deserialize_with = "ingredient_list")]
    pub ingredients: Vec<String>,
    #[serde(default = "default_suggest_count")]
    pub count: u32,
    #[serde(default)]
    pub ranking: RankingMode,
    #[serde(default = "default_true")]
    pub ignore_pantry: bool,
    #[serde(default = "default_true")]
    pub enrich: bool,
}

/// Query-string form: `?ingredients=chicken,rice&number=5&ranking=1`.
#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    pub ingredients: Option<String>,
    pub number: Option<u32>,
    pub ranking: Option<RankingMode>,
    #[serde(alias = "ignorePantry")]
    pub ignore_pantry: Option<bool>,
    pub enrich: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub recipes: Vec<Recommendation>,
}

fn default_suggest_count() -> u32 {
    DEFAULT_SUGGEST_COUNT
}

pub(crate) fn default_true() -> bool {
    true
}

fn split_ingredients(joined: &str) -> Vec<String> {
    joined.split(',').map(str::to_string).collect()
}

/// Ingredients as a JSON list or a single comma-separated string.
pub(crate) fn ingredient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IngredientList {
        List(Vec<String>),
        Joined(String),
    }

    match IngredientList::deserialize(deserializer) {
        Ok(IngredientList::List(items)) => Ok(items),
        Ok(IngredientList::Joined(joined)) => Ok(split_ingredients(&joined)),
        Err(_) => Err(serde::de::Error::custom(
            "ingredients must be a list of names or a comma-separated string",
        )),
    }
}

/// Validates caller input and builds the provider query.
/// Rejects an empty ingredient list and counts outside 1–10.
pub(crate) fn build_query(
    ingredients: &[String],
    count: u32,
    ranking: RankingMode,
    ignore_pantry: bool,
) -> Result<IngredientQuery, AppError> {
    let query = IngredientQuery::new(ingredients, count, ranking).with_ignore_pantry(ignore_pantry);

    if query.ingredients.is_empty() {
        return Err(AppError::Validation(
            "Provide at least one ingredient".to_string(),
        ));
    }
    if !(MIN_RESULTS..=MAX_RESULTS).contains(&count) {
        return Err(AppError::Validation(format!(
            "count must be between {MIN_RESULTS} and {MAX_RESULTS}"
        )));
    }

    Ok(query)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/recipes/suggest
///
/// Recipes reachable from the given ingredients, in provider relevance order,
/// each with a canonical link.
pub async fn handle_suggest(
    State(state): State<AppState>,
    payload: Result<Json<SuggestRequest>, JsonRejection>,
) -> Result<Json<SuggestResponse>, AppError> {
    let Json(request) = payload?;

    let query = build_query(
        &request.ingredients,
        request.count,
        request.ranking,
        request.ignore_pantry,
    )?;

    let recipes = state.recipes.recommend(&query, request.enrich).await?;

    Ok(Json(SuggestResponse { recipes }))
}

/// GET /api/v1/recipes/suggest?ingredients=a,b
///
/// Same as the POST form with comma-separated ingredients.
pub async fn handle_suggest_query(
    State(state): State<AppState>,
    params: Result<Query<SuggestParams>, QueryRejection>,
) -> Result<Json<SuggestResponse>, AppError> {
    let Query(params) = params?;
    let ingredients = split_ingredients(params.ingredients.as_deref().unwrap_or_default());

    let query = build_query(
        &ingredients,
        params.number.unwrap_or(DEFAULT_SUGGEST_COUNT),
        params.ranking.unwrap_or_default(),
        params.ignore_pantry.unwrap_or(true),
    )?;

    let recipes = state
        .recipes
        .recommend(&query, params.enrich.unwrap_or(true))
        .await?;

    Ok(Json(SuggestResponse { recipes }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_query_rejects_blank_ingredients() {
        let result = build_query(&names(&["", "  "]), 5, RankingMode::MaximizeUsed, true);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_build_query_rejects_out_of_range_count() {
        for count in [0, 11, 100] {
            let result = build_query(&names(&["egg"]), count, RankingMode::MaximizeUsed, true);
            assert!(matches!(result, Err(AppError::Validation(_))), "count {count}");
        }
    }

    #[test]
    fn test_build_query_normalizes() {
        let query = build_query(
            &names(&[" egg", "bread", "EGG"]),
            3,
            RankingMode::MinimizeMissed,
            false,
        )
        .unwrap();
        assert_eq!(query.ingredients, names(&["egg", "bread"]));
        assert_eq!(query.count, 3);
        assert!(!query.ignore_pantry);
    }

    #[test]
    fn test_request_accepts_joined_ingredients_and_numeric_ranking() {
        let request: SuggestRequest =
            serde_json::from_str(r#"{"ingredients": "egg, rice", "ranking": 2}"#).unwrap();
        assert_eq!(request.ingredients, names(&["egg", " rice"]));
        assert_eq!(request.ranking, RankingMode::MinimizeMissed);
        assert_eq!(request.count, DEFAULT_SUGGEST_COUNT);
        assert!(request.ignore_pantry);
    }

    #[test]
    fn test_request_rejects_non_text_ingredients() {
        let result = serde_json::from_str::<SuggestRequest>(r#"{"ingredients": 5}"#);
        assert!(result.is_err());
    }
}
