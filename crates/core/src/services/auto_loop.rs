//! Auto-loop meal generation.
//!
//! A nightly reconciliation pass: every user with an enabled recurring meal
//! preference gets tomorrow's meal-state entry materialized, unless they
//! already submitted one manually. Manual entries always win and are never
//! overwritten.

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use smartmess_common::{AppError, AppResult};
use smartmess_store::{
    AutoLoopPreference, DocumentStore, MealEntry, Query, WriteBatch, collections,
};

/// Result of one auto-loop run.
#[derive(Debug, Clone)]
pub struct AutoLoopSummary {
    /// The `YYYY-MM-DD` date entries were generated for.
    pub date: String,
    /// Entries staged and committed.
    pub staged: u64,
    /// Preferences skipped because a manual entry already existed.
    pub skipped: u64,
}

/// Service materializing meal-state entries from recurring preferences.
#[derive(Clone)]
pub struct AutoLoopService {
    documents: Arc<dyn DocumentStore>,
    tz: Tz,
}

impl AutoLoopService {
    /// Create a new auto-loop service. `tz` fixes the calendar used to
    /// compute "tomorrow".
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>, tz: Tz) -> Self {
        Self { documents, tz }
    }

    /// Run the nightly pass for tomorrow in the schedule timezone.
    pub async fn run_nightly(&self) -> AppResult<AutoLoopSummary> {
        let today = Utc::now().with_timezone(&self.tz).date_naive();
        let tomorrow = today
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AppError::Internal("Date overflow computing tomorrow".to_string()))?;
        self.run_for_date(tomorrow).await
    }

    /// Materialize entries for a specific date.
    pub async fn run_for_date(&self, date: NaiveDate) -> AppResult<AutoLoopSummary> {
        let date_key = date.format("%Y-%m-%d").to_string();

        let query = Query::eq(collections::USER_AUTO_LOOP, "enabled", true);
        let preferences = self.documents.query(&query).await?;

        if preferences.is_empty() {
            tracing::info!(date = %date_key, "No enabled auto-loop preferences");
            return Ok(AutoLoopSummary {
                date: date_key,
                staged: 0,
                skipped: 0,
            });
        }

        let mut batch = WriteBatch::new();
        let mut staged: u64 = 0;
        let mut skipped: u64 = 0;

        for doc in &preferences {
            let preference: AutoLoopPreference = match doc.decode() {
                Ok(preference) => preference,
                Err(e) => {
                    tracing::warn!(error = %e, id = %doc.id, "Skipping malformed preference");
                    continue;
                }
            };

            // Manual submissions take precedence and are never overwritten.
            // A manual entry landing between this read and the final commit
            // is not re-checked.
            let existing = self
                .documents
                .get(collections::USER_MEAL_STATE, &date_key)
                .await?;
            if existing.is_some_and(|doc| doc.data.get(&preference.ba_no).is_some()) {
                skipped += 1;
                continue;
            }

            let entry = MealEntry::from_pattern(
                preference.meal_pattern,
                preference.admin_created,
                Utc::now(),
            );
            let entry = serde_json::to_value(entry)
                .map_err(|e| AppError::Internal(format!("Failed to encode meal entry: {e}")))?;

            let mut fields = serde_json::Map::new();
            fields.insert(preference.ba_no, entry);
            batch.merge_set(collections::USER_MEAL_STATE, &date_key, Value::Object(fields));
            staged += 1;
        }

        if !batch.is_empty() {
            self.documents.commit(batch).await?;
        }

        tracing::info!(date = %date_key, staged, skipped, "Auto-loop run complete");
        Ok(AutoLoopSummary {
            date: date_key,
            staged,
            skipped,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use smartmess_store::MemoryDocumentStore;

    fn create_test_service() -> (Arc<MemoryDocumentStore>, AutoLoopService) {
        let documents = Arc::new(MemoryDocumentStore::new());
        let service = AutoLoopService::new(documents.clone(), chrono_tz::Asia::Dhaka);
        (documents, service)
    }

    fn seed_preference(
        documents: &MemoryDocumentStore,
        ba_no: &str,
        enabled: bool,
        pattern: serde_json::Value,
        admin_created: bool,
    ) {
        documents.insert(
            collections::USER_AUTO_LOOP,
            ba_no,
            json!({
                "ba_no": ba_no,
                "enabled": enabled,
                "meal_pattern": pattern,
                "name": "Test User",
                "rank": "Maj",
                "admin_created": admin_created,
            }),
        );
    }

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 8).unwrap()
    }

    #[tokio::test]
    async fn test_zero_enabled_preferences_issue_zero_writes() {
        let (documents, service) = create_test_service();
        seed_preference(&documents, "BA-1", false, json!({"breakfast": true}), false);

        let summary = service.run_for_date(test_date()).await.unwrap();

        assert_eq!(summary.staged, 0);
        assert_eq!(documents.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_manual_entry_is_never_overwritten() {
        let (documents, service) = create_test_service();
        seed_preference(&documents, "X", true, json!({"breakfast": true}), false);
        documents.insert(
            collections::USER_MEAL_STATE,
            "2026-08-08",
            json!({"X": {"breakfast": false, "lunch": true, "dinner": false, "remarks": "late duty", "generated_at": "2026-08-07T10:00:00Z"}}),
        );

        let summary = service.run_for_date(test_date()).await.unwrap();

        assert_eq!(summary.staged, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(documents.commit_count(), 0);

        let doc = documents
            .get(collections::USER_MEAL_STATE, "2026-08-08")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.data["X"]["remarks"], json!("late duty"));
        assert_eq!(doc.data["X"]["lunch"], json!(true));
    }

    #[tokio::test]
    async fn test_all_new_entries_commit_in_one_batch() {
        let (documents, service) = create_test_service();
        seed_preference(&documents, "BA-1", true, json!({"breakfast": true}), false);
        seed_preference(&documents, "BA-2", true, json!({"lunch": true}), true);
        seed_preference(&documents, "BA-3", true, json!({"dinner": true}), false);

        let summary = service.run_for_date(test_date()).await.unwrap();

        assert_eq!(summary.staged, 3);
        assert_eq!(summary.skipped, 0);
        assert_eq!(documents.commit_count(), 1);

        let doc = documents
            .get(collections::USER_MEAL_STATE, "2026-08-08")
            .await
            .unwrap()
            .unwrap();
        for ba_no in ["BA-1", "BA-2", "BA-3"] {
            let entry: MealEntry = serde_json::from_value(doc.data[ba_no].clone()).unwrap();
            assert!(entry.auto_loop_generated);
        }
        let entry: MealEntry = serde_json::from_value(doc.data["BA-2"].clone()).unwrap();
        assert!(entry.admin_generated);
        let entry: MealEntry = serde_json::from_value(doc.data["BA-1"].clone()).unwrap();
        assert!(!entry.admin_generated);
    }

    #[tokio::test]
    async fn test_mixed_existing_and_new() {
        let (documents, service) = create_test_service();
        seed_preference(&documents, "BA-1", true, json!({"breakfast": true}), false);
        seed_preference(&documents, "BA-2", true, json!({"lunch": true}), false);
        documents.insert(
            collections::USER_MEAL_STATE,
            "2026-08-08",
            json!({"BA-1": {"breakfast": true, "generated_at": "2026-08-07T09:00:00Z"}}),
        );

        let summary = service.run_for_date(test_date()).await.unwrap();

        assert_eq!(summary.staged, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(documents.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_staged_entry_shape() {
        let (documents, service) = create_test_service();
        seed_preference(
            &documents,
            "A1",
            true,
            json!({"breakfast": true, "lunch": false, "dinner": true}),
            false,
        );

        service.run_for_date(test_date()).await.unwrap();

        let doc = documents
            .get(collections::USER_MEAL_STATE, "2026-08-08")
            .await
            .unwrap()
            .unwrap();
        let entry: MealEntry = serde_json::from_value(doc.data["A1"].clone()).unwrap();

        assert!(entry.breakfast);
        assert!(!entry.lunch);
        assert!(entry.dinner);
        assert_eq!(entry.remarks, "");
        assert!(!entry.disposal);
        assert!(!entry.admin_generated);
        assert!(entry.auto_loop_generated);
    }

    #[tokio::test]
    async fn test_missing_pattern_flags_default_to_false() {
        let (documents, service) = create_test_service();
        seed_preference(&documents, "BA-9", true, json!({"dinner": true}), false);

        service.run_for_date(test_date()).await.unwrap();

        let doc = documents
            .get(collections::USER_MEAL_STATE, "2026-08-08")
            .await
            .unwrap()
            .unwrap();
        let entry: MealEntry = serde_json::from_value(doc.data["BA-9"].clone()).unwrap();
        assert!(!entry.breakfast);
        assert!(!entry.lunch);
        assert!(entry.dinner);
    }
}
