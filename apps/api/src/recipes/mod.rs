// Recipe recommendations: ingredient search, detail enrichment, canonical links.
// All provider calls go through recipe_client; nothing here builds HTTP requests.

pub mod detail_cache;
pub mod handlers;
pub mod links;
pub mod service;
