// Meal planning: orders recommended recipes into day slots with ingredient spacing.

pub mod handlers;
pub mod scheduler;
