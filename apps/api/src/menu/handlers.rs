//! Axum route handlers for the Menu API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::recipe::RankingMode;
use crate::recipe_client::MAX_RESULTS;
use crate::recipes::handlers::{build_query, default_true, ingredient_list};
use crate::recipes::service::{MenuPlan, MAX_MENU_DAYS};
use crate::state::AppState;

pub const DEFAULT_MENU_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
pub struct WeeklyMenuRequest {
    #[serde(deserialize_with = "ingredient_list")]
    pub ingredients: Vec<String>,
    /// Candidate pool size fetched from the provider.
    #[serde(default = "default_menu_count")]
    pub count: u32,
    #[serde(default)]
    pub ranking: RankingMode,
    #[serde(default = "default_true")]
    pub ignore_pantry: bool,
    #[serde(default = "default_menu_days")]
    pub days: i64,
    #[serde(default = "default_true")]
    pub enrich: bool,
}

fn default_menu_count() -> u32 {
    MAX_RESULTS
}

fn default_menu_days() -> i64 {
    DEFAULT_MENU_DAYS
}

/// POST /api/v1/menu/weekly
///
/// Recommends recipes for the ingredients and spreads them over `days` days,
/// never repeating a primary ingredient within three consecutive days.
/// The menu may be shorter than `days` when too few recipes qualify.
pub async fn handle_weekly_menu(
    State(state): State<AppState>,
    payload: Result<Json<WeeklyMenuRequest>, JsonRejection>,
) -> Result<Json<MenuPlan>, AppError> {
    let Json(request) = payload?;

    let days = usize::try_from(request.days)
        .ok()
        .filter(|d| *d <= MAX_MENU_DAYS)
        .ok_or_else(|| {
            AppError::Validation(format!("days must be between 0 and {MAX_MENU_DAYS}"))
        })?;

    let query = build_query(
        &request.ingredients,
        request.count,
        request.ranking,
        request.ignore_pantry,
    )?;

    let plan = state
        .recipes
        .plan_menu(&query, days, request.enrich)
        .await?;

    Ok(Json(plan))
}
