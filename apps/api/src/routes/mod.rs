pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::menu::handlers as menu;
use crate::recipes::handlers as recipes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/env-check", get(health::env_check_handler))
        // Recipes API
        .route(
            "/api/v1/recipes/suggest",
            get(recipes::handle_suggest_query).post(recipes::handle_suggest),
        )
        // Menu API
        .route("/api/v1/menu/weekly", post(menu::handle_weekly_menu))
        .with_state(state)
}
