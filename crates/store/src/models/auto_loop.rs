//! Recurring auto-loop meal preferences.

use serde::{Deserialize, Serialize};

/// The three daily meal flags. Missing flags deserialize to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPattern {
    #[serde(default)]
    pub breakfast: bool,
    #[serde(default)]
    pub lunch: bool,
    #[serde(default)]
    pub dinner: bool,
}

/// A recurring meal preference from the `user_auto_loop` collection, keyed by
/// `ba_no`. Written by the user-facing preference flows; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoLoopPreference {
    /// Business identifier of the user.
    pub ba_no: String,
    /// Whether the auto loop is active for this user.
    #[serde(default)]
    pub enabled: bool,
    /// The meals to generate each day.
    #[serde(default)]
    pub meal_pattern: MealPattern,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Rank.
    #[serde(default)]
    pub rank: String,
    /// Whether an administrator created this preference on the user's behalf.
    #[serde(default)]
    pub admin_created: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_meal_flags_default_to_false() {
        let preference: AutoLoopPreference = serde_json::from_value(json!({
            "ba_no": "BA-4821",
            "enabled": true,
            "meal_pattern": { "breakfast": true },
        }))
        .unwrap();

        assert!(preference.meal_pattern.breakfast);
        assert!(!preference.meal_pattern.lunch);
        assert!(!preference.meal_pattern.dinner);
        assert!(!preference.admin_created);
    }
}
