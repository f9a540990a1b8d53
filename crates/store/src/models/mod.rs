//! Typed document models.

pub mod auto_loop;
pub mod meal_state;
pub mod staff;

pub use auto_loop::{AutoLoopPreference, MealPattern};
pub use meal_state::MealEntry;
pub use staff::{StaffRecord, StaffRole};
