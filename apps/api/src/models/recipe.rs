use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Provider ranking strategy for ingredient search.
/// Serializes as snake_case; deserializes from the name or the provider number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    #[default]
    MaximizeUsed,
    MinimizeMissed,
}

impl RankingMode {
    /// Numeric value the provider expects in the `ranking` parameter.
    pub fn provider_value(self) -> u8 {
        match self {
            RankingMode::MaximizeUsed => 1,
            RankingMode::MinimizeMissed => 2,
        }
    }

    pub fn from_provider_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(RankingMode::MaximizeUsed),
            2 => Some(RankingMode::MinimizeMissed),
            _ => None,
        }
    }

    /// Accepts `maximize_used` / `minimize_missed` or the numeric form as text.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "maximize_used" | "1" => Some(RankingMode::MaximizeUsed),
            "minimize_missed" | "2" => Some(RankingMode::MinimizeMissed),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for RankingMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Name(String),
        }

        let parsed = match Repr::deserialize(deserializer)? {
            Repr::Number(n) => u8::try_from(n).ok().and_then(Self::from_provider_value),
            Repr::Name(name) => Self::from_name(&name),
        };
        parsed.ok_or_else(|| {
            serde::de::Error::custom(
                "ranking must be 1, 2, \"maximize_used\" or \"minimize_missed\"",
            )
        })
    }
}

/// An ingredient search as issued to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientQuery {
    pub ingredients: Vec<String>,
    pub count: u32,
    pub ranking: RankingMode,
    pub ignore_pantry: bool,
}

impl IngredientQuery {
    /// Trims names, drops blanks and keeps the first occurrence of each
    /// (case-insensitive) ingredient in caller order.
    pub fn new<I, S>(ingredients: I, count: u32, ranking: RankingMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: Vec<String> = Vec::new();
        let mut names = Vec::new();
        for raw in ingredients {
            let name = raw.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            let key = name.to_lowercase();
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            names.push(name.to_string());
        }

        Self {
            ingredients: names,
            count,
            ranking,
            ignore_pantry: true,
        }
    }

    pub fn with_ignore_pantry(mut self, ignore_pantry: bool) -> Self {
        self.ignore_pantry = ignore_pantry;
        self
    }
}

/// Minimal recipe summary returned by the ingredient search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeStub {
    pub id: u64,
    pub title: String,
    pub image: Option<String>,
    pub used_ingredients: Vec<String>,
    pub missed_ingredients: Vec<String>,
    pub likes: Option<u32>,
}

impl AsRef<RecipeStub> for RecipeStub {
    fn as_ref(&self) -> &RecipeStub {
        self
    }
}

/// Per-recipe detail fetched lazily and cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub id: u64,
    pub source_url: Option<String>,
    pub ready_in_minutes: Option<u32>,
    pub servings: Option<u32>,
    pub fetched_at: DateTime<Utc>,
}

/// A stub enriched with its resolved link and whatever detail was available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub stub: RecipeStub,
    pub source_url: String,
    pub ready_in_minutes: Option<u32>,
    pub servings: Option<u32>,
}

impl AsRef<RecipeStub> for Recommendation {
    fn as_ref(&self) -> &RecipeStub {
        &self.stub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_trims_and_dedupes_ingredients() {
        let query = IngredientQuery::new(
            [" Tomato", "basil ", "", "tomato", "  "],
            5,
            RankingMode::MaximizeUsed,
        );
        assert_eq!(query.ingredients, vec!["Tomato", "basil"]);
        assert!(query.ignore_pantry);
    }

    #[test]
    fn test_ranking_provider_values() {
        assert_eq!(RankingMode::MaximizeUsed.provider_value(), 1);
        assert_eq!(RankingMode::MinimizeMissed.provider_value(), 2);
        assert_eq!(RankingMode::from_provider_value(2), Some(RankingMode::MinimizeMissed));
        assert_eq!(RankingMode::from_provider_value(3), None);
    }

    #[test]
    fn test_ranking_deserializes_from_number_or_name() {
        let parse = |raw: &str| serde_json::from_str::<RankingMode>(raw).ok();
        assert_eq!(parse("2"), Some(RankingMode::MinimizeMissed));
        assert_eq!(parse(r#""maximize_used""#), Some(RankingMode::MaximizeUsed));
        assert_eq!(parse(r#""2""#), Some(RankingMode::MinimizeMissed));
        assert_eq!(parse("9"), None);
        assert_eq!(parse(r#""best""#), None);
        assert_eq!(
            serde_json::to_value(RankingMode::MinimizeMissed).unwrap(),
            "minimize_missed"
        );
    }

    #[test]
    fn test_recommendation_serializes_flat() {
        let rec = Recommendation {
            stub: RecipeStub {
                id: 7,
                title: "Pesto".to_string(),
                image: None,
                used_ingredients: vec!["basil".to_string()],
                missed_ingredients: vec![],
                likes: Some(3),
            },
            source_url: "https://example.com/pesto".to_string(),
            ready_in_minutes: Some(15),
            servings: None,
        };
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["source_url"], "https://example.com/pesto");
        assert_eq!(value["used_ingredients"][0], "basil");
    }
}
