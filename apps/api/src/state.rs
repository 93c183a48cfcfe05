use crate::recipes::service::RecipeService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Search client, detail cache and scheduler behind one facade.
    /// The detail cache inside is the only process-wide mutable state.
    pub recipes: RecipeService,
}
