//! Provider payload shapes and their normalization into domain types.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::recipe::{RecipeDetail, RecipeStub};

/// Search responses are normally a bare list, but some plans wrap them.
/// Items stay raw so one malformed entry cannot fail the whole list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SearchPayload {
    List(Vec<Value>),
    Wrapped { results: Vec<Value> },
}

impl SearchPayload {
    fn into_items(self) -> Vec<Value> {
        match self {
            SearchPayload::List(items) => items,
            SearchPayload::Wrapped { results } => results,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    id: Option<Value>,
    title: Option<String>,
    image: Option<String>,
    used_ingredients: Option<Vec<Value>>,
    missed_ingredients: Option<Vec<Value>>,
    likes: Option<Value>,
}

impl SearchItem {
    fn id(&self) -> Option<u64> {
        self.id.as_ref().and_then(Value::as_u64)
    }

    fn likes(&self) -> Option<u32> {
        self.likes
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    }
}

/// Ingredients arrive as `{ "name": ... }` objects or as bare strings.
fn ingredient_name(value: Value) -> Option<String> {
    let name = match value {
        Value::String(name) => name,
        Value::Object(mut map) => match map.remove("name") {
            Some(Value::String(name)) => name,
            _ => return None,
        },
        _ => return None,
    };
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn ingredient_names(values: Option<Vec<Value>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .filter_map(ingredient_name)
        .collect()
}

/// Converts a search payload into stubs, keeping provider order.
/// Malformed items and items without a numeric id are dropped, duplicate ids
/// keep their first occurrence, and the result never exceeds `limit`.
pub(crate) fn normalize_search(payload: SearchPayload, limit: usize) -> Vec<RecipeStub> {
    let mut seen = HashSet::new();
    let mut stubs = Vec::new();

    for raw in payload.into_items() {
        if stubs.len() >= limit {
            break;
        }
        let item: SearchItem = match serde_json::from_value(raw) {
            Ok(item) => item,
            Err(e) => {
                warn!("Dropping malformed search result: {e}");
                continue;
            }
        };
        let Some(id) = item.id() else {
            warn!("Dropping search result without a usable id: {:?}", item.title);
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        let likes = item.likes();
        stubs.push(RecipeStub {
            id,
            title: item.title.unwrap_or_default(),
            image: item.image.filter(|s| !s.trim().is_empty()),
            used_ingredients: ingredient_names(item.used_ingredients),
            missed_ingredients: ingredient_names(item.missed_ingredients),
            likes,
        });
    }

    stubs
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DetailPayload {
    source_url: Option<String>,
    ready_in_minutes: Option<f64>,
    servings: Option<f64>,
}

pub(crate) fn normalize_detail(
    id: u64,
    payload: DetailPayload,
    fetched_at: DateTime<Utc>,
) -> RecipeDetail {
    RecipeDetail {
        id,
        source_url: payload
            .source_url
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        ready_in_minutes: whole_number(payload.ready_in_minutes),
        servings: whole_number(payload.servings),
        fetched_at,
    }
}

fn whole_number(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0 && *v <= u32::MAX as f64)
        .map(|v| v.round() as u32)
}
