pub mod menu;
pub mod recipe;
