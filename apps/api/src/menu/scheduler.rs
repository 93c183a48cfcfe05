//! Menu Scheduler: turns an unordered candidate list into a day-by-day menu.
//!
//! Candidates are bucketed by primary ingredient and picked round-robin across
//! buckets in first-seen order. A pick is only allowed when its primary
//! ingredient is not among the last `WINDOW_SIZE` accepted primaries, so the
//! same main ingredient does not show up on consecutive days.
//!
//! Pure and infallible: malformed candidates degrade to the "no primary"
//! bucket, and the loop is bounded by `MAX_ROUNDS`.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::models::menu::{day_label, MenuSlot, WeeklyMenu};
use crate::models::recipe::RecipeStub;

/// Number of recent primaries a new pick must differ from.
pub const WINDOW_SIZE: usize = 3;
/// Hard cap on bucket visits per scheduling call.
pub const MAX_ROUNDS: usize = 1000;

/// First used ingredient, else first missed ingredient, else "" (no primary).
pub fn primary_ingredient(stub: &RecipeStub) -> String {
    stub.used_ingredients
        .first()
        .or_else(|| stub.missed_ingredients.first())
        .map(|name| name.trim().to_lowercase())
        .unwrap_or_default()
}

/// The last `WINDOW_SIZE` accepted primary tags, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiversityWindow {
    recent: VecDeque<String>,
}

impl DiversityWindow {
    /// The empty tag never blocks.
    pub fn blocks(&self, tag: &str) -> bool {
        !tag.is_empty() && self.recent.iter().any(|t| t == tag)
    }

    /// Returns the window after accepting `tag`, evicting the oldest entry when full.
    #[must_use]
    pub fn accept(mut self, tag: &str) -> Self {
        if self.recent.len() == WINDOW_SIZE {
            self.recent.pop_front();
        }
        self.recent.push_back(tag.to_string());
        self
    }
}

struct Bucket {
    tag: String,
    members: Vec<usize>,
    cursor: usize,
}

impl Bucket {
    /// Index of the earliest member whose id has not been scheduled yet.
    fn next_unused<T: AsRef<RecipeStub>>(
        &mut self,
        candidates: &[T],
        used: &HashSet<u64>,
    ) -> Option<usize> {
        while let Some(&i) = self.members.get(self.cursor) {
            if !used.contains(&candidates[i].as_ref().id) {
                return Some(i);
            }
            self.cursor += 1;
        }
        None
    }
}

/// Groups candidate indices by primary ingredient, buckets in first-seen order.
fn bucket_by_primary<T: AsRef<RecipeStub>>(candidates: &[T]) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();

    for (i, candidate) in candidates.iter().enumerate() {
        let tag = primary_ingredient(candidate.as_ref());
        match buckets.iter_mut().find(|b| b.tag == tag) {
            Some(bucket) => bucket.members.push(i),
            None => buckets.push(Bucket {
                tag,
                members: vec![i],
                cursor: 0,
            }),
        }
    }

    buckets
}

/// Selects and orders up to `days` candidates into day slots.
///
/// Algorithm:
/// 1. Bucket candidates by primary ingredient, keeping input order per bucket
/// 2. Visit buckets round-robin; pick the bucket's earliest unused candidate
///    unless its primary is in the diversity window, in which case skip it
/// 3. Drop a bucket from rotation once it has no unused candidates left
/// 4. Stop when `days` picks are made, no bucket remains, a full pass makes no
///    progress, or `MAX_ROUNDS` visits have happened
/// 5. Label picks Mon..Sun by index, cycling weekly
pub fn schedule<T>(candidates: &[T], days: usize) -> WeeklyMenu<T>
where
    T: AsRef<RecipeStub> + Clone,
{
    if candidates.is_empty() || days == 0 {
        return WeeklyMenu::empty();
    }

    let mut buckets = bucket_by_primary(candidates);
    let mut window = DiversityWindow::default();
    let mut used: HashSet<u64> = HashSet::new();
    let mut picks: Vec<usize> = Vec::with_capacity(days.min(candidates.len()));

    let mut position = 0;
    let mut rounds = 0;
    let mut blocked_streak = 0;

    while picks.len() < days && !buckets.is_empty() && rounds < MAX_ROUNDS {
        rounds += 1;
        let pos = position % buckets.len();
        let bucket = &mut buckets[pos];

        let Some(choice) = bucket.next_unused(candidates, &used) else {
            buckets.remove(pos);
            position = pos;
            continue;
        };

        if window.blocks(&bucket.tag) {
            blocked_streak += 1;
            // Every remaining bucket is blocked and the window only moves on a pick.
            if blocked_streak >= buckets.len() {
                break;
            }
            position = pos + 1;
            continue;
        }

        bucket.cursor += 1;
        used.insert(candidates[choice].as_ref().id);
        window = window.accept(&bucket.tag);
        picks.push(choice);
        blocked_streak = 0;
        position = pos + 1;
    }

    debug!(
        "Scheduled {} of {} requested days from {} candidates in {} rounds",
        picks.len(),
        days,
        candidates.len(),
        rounds
    );

    WeeklyMenu {
        slots: picks
            .into_iter()
            .enumerate()
            .map(|(day_index, i)| MenuSlot {
                day_index,
                day_label: day_label(day_index),
                recipe: candidates[i].clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub(id: u64, used: &[&str], missed: &[&str]) -> RecipeStub {
        RecipeStub {
            id,
            title: format!("Recipe {id}"),
            image: None,
            used_ingredients: used.iter().map(|s| s.to_string()).collect(),
            missed_ingredients: missed.iter().map(|s| s.to_string()).collect(),
            likes: None,
        }
    }

    fn ids(menu: &WeeklyMenu<RecipeStub>) -> Vec<u64> {
        menu.slots.iter().map(|s| s.recipe.id).collect()
    }

    #[test]
    fn test_primary_ingredient_precedence() {
        assert_eq!(primary_ingredient(&stub(1, &["Tomato", "basil"], &["salt"])), "tomato");
        assert_eq!(primary_ingredient(&stub(2, &[], &["Flour"])), "flour");
        assert_eq!(primary_ingredient(&stub(3, &[], &[])), "");
    }

    #[test]
    fn test_window_slides_and_ignores_empty_tag() {
        let window = DiversityWindow::default()
            .accept("a")
            .accept("b")
            .accept("c")
            .accept("d");
        assert!(!window.blocks("a"));
        assert!(window.blocks("b"));
        assert!(window.blocks("d"));

        let window = window.accept("");
        assert!(!window.blocks(""));
        assert!(!window.blocks("b"));
    }

    #[test]
    fn test_never_places_same_primary_adjacent_while_alternative_exists() {
        let candidates = vec![
            stub(1, &["tomato"], &[]),
            stub(2, &["tomato"], &[]),
            stub(3, &["basil"], &[]),
        ];
        let menu = schedule(&candidates, 3);

        let primaries: Vec<String> = menu
            .slots
            .iter()
            .map(|s| primary_ingredient(&s.recipe))
            .collect();
        for pair in primaries.windows(2) {
            assert_ne!(pair[0], pair[1], "adjacent repeat in {primaries:?}");
        }
        assert_eq!(ids(&menu), vec![1, 3]);
    }

    #[test]
    fn test_fewer_candidates_than_days_returns_shorter_menu() {
        let candidates = vec![
            stub(1, &["egg"], &[]),
            stub(2, &["rice"], &[]),
            stub(3, &["beans"], &[]),
        ];
        let menu = schedule(&candidates, 7);
        assert_eq!(menu.slots.len(), 3);
        assert_eq!(ids(&menu), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_inputs_yield_empty_menu() {
        let none: Vec<RecipeStub> = vec![];
        assert!(schedule(&none, 7).slots.is_empty());
        assert!(schedule(&[stub(1, &["egg"], &[])], 0).slots.is_empty());
    }

    #[test]
    fn test_round_robin_over_four_primaries_fills_week() {
        let candidates = vec![
            stub(1, &["a"], &[]),
            stub(2, &["a"], &[]),
            stub(3, &["b"], &[]),
            stub(4, &["b"], &[]),
            stub(5, &["c"], &[]),
            stub(6, &["c"], &[]),
            stub(7, &["d"], &[]),
            stub(8, &["d"], &[]),
        ];
        let menu = schedule(&candidates, 7);

        assert_eq!(ids(&menu), vec![1, 3, 5, 7, 2, 4, 6]);
        let labels: Vec<&str> = menu.slots.iter().map(|s| s.day_label).collect();
        assert_eq!(labels, vec!["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        let indices: Vec<usize> = menu.slots.iter().map(|s| s.day_index).collect();
        assert_eq!(indices, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_labels_cycle_past_one_week() {
        let candidates: Vec<RecipeStub> = (1..=9).map(|id| stub(id, &[], &[])).collect();
        let menu = schedule(&candidates, 9);
        assert_eq!(menu.slots.len(), 9);
        assert_eq!(menu.slots[7].day_label, "Mon");
        assert_eq!(menu.slots[8].day_label, "Tue");
    }

    #[test]
    fn test_candidates_without_ingredients_are_never_blocked() {
        let candidates = vec![stub(1, &[], &[]), stub(2, &[], &[]), stub(3, &[], &[])];
        assert_eq!(ids(&schedule(&candidates, 3)), vec![1, 2, 3]);
    }

    #[test]
    fn test_missed_ingredient_used_as_primary() {
        let candidates = vec![
            stub(1, &[], &["flour"]),
            stub(2, &[], &["flour"]),
            stub(3, &["sugar"], &["flour"]),
        ];
        assert_eq!(ids(&schedule(&candidates, 3)), vec![1, 3]);
    }

    #[test]
    fn test_duplicate_ids_scheduled_once() {
        let candidates = vec![
            stub(1, &["egg"], &[]),
            stub(1, &["egg"], &[]),
            stub(2, &["rice"], &[]),
            stub(1, &["milk"], &[]),
        ];
        let menu = schedule(&candidates, 7);
        assert_eq!(ids(&menu), vec![1, 2]);
    }

    #[test]
    fn test_menu_never_longer_than_days() {
        let candidates: Vec<RecipeStub> = (1..=20)
            .map(|id| stub(id, &[format!("i{id}").as_str()], &[]))
            .collect();
        for days in 0..=10 {
            assert_eq!(schedule(&candidates, days).slots.len(), days);
        }
    }

    #[test]
    fn test_single_dominant_ingredient_terminates() {
        let candidates: Vec<RecipeStub> = (1..=500).map(|id| stub(id, &["rice"], &[])).collect();
        let menu = schedule(&candidates, 7);
        assert_eq!(ids(&menu), vec![1]);
    }
}
