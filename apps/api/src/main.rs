mod config;
mod errors;
mod menu;
mod models;
mod recipe_client;
mod recipes;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::recipes::service::RecipeService;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Prepify API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize recipe provider client + detail cache
    let recipes = RecipeService::from_config(&config)?;
    info!(
        "Recipe provider client initialized (base: {}, max attempts: {}, cache TTL: {}s)",
        config.spoonacular_base_url,
        config.max_retries,
        config.detail_cache_ttl.num_seconds()
    );
    if !recipes.has_api_key() {
        warn!("SPOONACULAR_API_KEY is not set; recipe endpoints will fail until it is configured");
    }

    let state = AppState { recipes };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
