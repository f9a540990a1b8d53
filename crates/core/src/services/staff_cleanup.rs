//! Staff cleanup reactor.
//!
//! Fires whenever a staff document is deleted, by whatever actor. Best-effort
//! deletes the matching identity record and every mirrored user document.
//! Nothing is ever surfaced to a caller: the triggering document is already
//! gone, so there is nobody to report to and no point in retrying.

use std::sync::Arc;

use serde::Deserialize;
use smartmess_common::AppResult;
use smartmess_store::{DocumentStore, IdentityStore, Query, StaffRole, WriteBatch, collections};

/// The prior state of a deleted staff document.
#[derive(Debug, Clone, Deserialize)]
pub struct StaffDeletedEvent {
    /// Key of the deleted document.
    pub staff_id: String,
    /// Prior email, when the document carried one.
    #[serde(default)]
    pub email: Option<String>,
    /// Prior role, when the document carried one.
    #[serde(default)]
    pub role: Option<StaffRole>,
}

/// Reactor for staff document deletions.
#[derive(Clone)]
pub struct StaffCleanupService {
    documents: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityStore>,
}

impl StaffCleanupService {
    /// Create a new staff cleanup service.
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityStore>) -> Self {
        Self {
            documents,
            identity,
        }
    }

    /// React to a deleted staff document. Every failure is logged and
    /// swallowed; the two cleanup steps are fault-isolated from each other.
    pub async fn handle_staff_deleted(&self, event: &StaffDeletedEvent) {
        if event.role == Some(StaffRole::Pmc) {
            // The deletion service refuses PMC targets, so reaching this
            // means the document was removed out of band. Cleanup proceeds.
            tracing::error!(
                staff_id = %event.staff_id,
                email = ?event.email,
                "CRITICAL: PMC account was deleted. PMC serves as super admin"
            );
        }

        let Some(email) = event.email.as_deref() else {
            tracing::warn!(
                staff_id = %event.staff_id,
                "No email on deleted staff document, skipping cleanup"
            );
            return;
        };

        tracing::info!(email, role = ?event.role, "Cleanup triggered for deleted staff");

        if let Err(e) = self.cleanup_identity(email).await {
            tracing::error!(error = %e, email, "Failed to delete identity record");
        }

        if let Err(e) = self.cleanup_mirror_documents(email).await {
            tracing::error!(error = %e, email, "Failed to delete mirrored user documents");
        }
    }

    async fn cleanup_identity(&self, email: &str) -> AppResult<()> {
        match self.identity.find_by_email(email).await? {
            Some(record) => {
                self.identity.delete(&record.uid).await?;
                tracing::info!(email, uid = %record.uid, "Deleted identity record for removed staff");
            }
            None => {
                tracing::info!(email, "Identity record already deleted or never existed");
            }
        }
        Ok(())
    }

    async fn cleanup_mirror_documents(&self, email: &str) -> AppResult<()> {
        let query = Query::eq(collections::USERS, "email", email);
        let mirrors = self.documents.query(&query).await?;

        if mirrors.is_empty() {
            tracing::info!(email, "No mirrored user documents found");
            return Ok(());
        }

        let mut batch = WriteBatch::new();
        for doc in &mirrors {
            batch.delete(collections::USERS, &doc.id);
        }
        let count = batch.len();
        self.documents.commit(batch).await?;
        tracing::info!(email, count, "Deleted mirrored user documents");
        Ok(())
    }
}
