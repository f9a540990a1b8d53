//! Daily meal-state entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MealPattern;

/// One user's meal state for one day.
///
/// A `user_meal_state` document is keyed by the `YYYY-MM-DD` date and maps
/// each `ba_no` to one of these entries. Entries are either submitted
/// manually by the user or generated by the auto loop; a manual entry is
/// never overwritten by generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealEntry {
    #[serde(default)]
    pub breakfast: bool,
    #[serde(default)]
    pub lunch: bool,
    #[serde(default)]
    pub dinner: bool,
    /// Free-text remarks.
    #[serde(default)]
    pub remarks: String,
    /// Whether the meals are marked for disposal.
    #[serde(default)]
    pub disposal: bool,
    /// Disposal destination, when `disposal` is set.
    #[serde(default)]
    pub disposal_dest: String,
    /// Whether the originating preference was created by an administrator.
    #[serde(default)]
    pub admin_generated: bool,
    /// Whether this entry was generated by the auto loop.
    #[serde(default)]
    pub auto_loop_generated: bool,
    /// When this entry was written.
    pub generated_at: DateTime<Utc>,
}

impl MealEntry {
    /// Build an auto-loop entry from a recurring meal pattern.
    #[must_use]
    pub fn from_pattern(
        pattern: MealPattern,
        admin_generated: bool,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            breakfast: pattern.breakfast,
            lunch: pattern.lunch,
            dinner: pattern.dinner,
            remarks: String::new(),
            disposal: false,
            disposal_dest: String::new(),
            admin_generated,
            auto_loop_generated: true,
            generated_at,
        }
    }
}
