//! Collection names used across the document store.

/// Staff administration records.
pub const STAFF_STATE: &str = "staff_state";

/// Mirrored user profile documents.
pub const USERS: &str = "users";

/// Recurring auto-loop meal preferences, keyed by `ba_no`.
pub const USER_AUTO_LOOP: &str = "user_auto_loop";

/// Daily meal-state documents, keyed by `YYYY-MM-DD`.
pub const USER_MEAL_STATE: &str = "user_meal_state";
