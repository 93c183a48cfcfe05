use serde::Serialize;

/// Day labels cycled by day index.
pub const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuSlot<T> {
    pub day_index: usize,
    pub day_label: &'static str,
    pub recipe: T,
}

/// Ordered day-by-day menu. Only filled days are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeeklyMenu<T> {
    pub slots: Vec<MenuSlot<T>>,
}

impl<T> WeeklyMenu<T> {
    pub fn empty() -> Self {
        Self { slots: Vec::new() }
    }
}

pub fn day_label(day_index: usize) -> &'static str {
    DAY_LABELS[day_index % DAY_LABELS.len()]
}
