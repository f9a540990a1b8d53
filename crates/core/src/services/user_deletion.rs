//! User deletion service.
//!
//! Deletes a user's identity record by email, gated by the caller's staff
//! role and the PMC protection invariant. Mirror-document cleanup is not done
//! here; it belongs to the staff cleanup reactor, which fires when the staff
//! document itself is deleted.

use std::sync::Arc;

use serde::Serialize;
use smartmess_common::{AppError, AppResult};
use smartmess_store::{
    CallerIdentity, DocumentStore, IdentityStore, Query, StaffRecord, StaffRole, collections,
};

/// Outcome of a deletion request.
#[derive(Debug, Clone, Serialize)]
pub struct DeletionOutcome {
    /// Always true on the success path; absent targets are success too.
    pub success: bool,
    /// Human-readable confirmation or informational message.
    pub message: String,
}

/// Service for deleting users from the identity store.
#[derive(Clone)]
pub struct UserDeletionService {
    documents: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityStore>,
}

impl UserDeletionService {
    /// Create a new user deletion service.
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityStore>) -> Self {
        Self {
            documents,
            identity,
        }
    }

    /// Delete the identity record addressed by `email`.
    ///
    /// The caller must hold one of the administrative staff roles, and a
    /// target holding the PMC role is never deleted, whoever asks. An email
    /// with no identity record behind it is reported as success.
    pub async fn delete_by_email(
        &self,
        caller: Option<&CallerIdentity>,
        email: &str,
    ) -> AppResult<DeletionOutcome> {
        if email.trim().is_empty() {
            return Err(AppError::Validation("Email is required".to_string()));
        }

        let Some(caller) = caller else {
            return Err(AppError::Unauthorized);
        };

        self.require_admin(caller).await?;
        self.require_deletable(email).await?;

        let Some(record) = self.identity.find_by_email(email).await? else {
            tracing::info!(email, "Identity record not found, nothing to delete");
            return Ok(DeletionOutcome {
                success: true,
                message: "User not found in the identity store (may have been already deleted)"
                    .to_string(),
            });
        };

        self.identity.delete(&record.uid).await?;
        tracing::info!(email, uid = %record.uid, "Deleted user from identity store");

        Ok(DeletionOutcome {
            success: true,
            message: format!("User {email} deleted successfully from the identity store"),
        })
    }

    /// Verify the caller holds an administrative staff role.
    async fn require_admin(&self, caller: &CallerIdentity) -> AppResult<()> {
        let query = Query::eq(collections::STAFF_STATE, "email", caller.email.as_str())
            .and_in("role", StaffRole::ADMIN_ROLE_NAMES);

        if self.documents.query(&query).await?.is_empty() {
            return Err(AppError::Forbidden(
                "Insufficient permissions. Only authorized administrators can delete users."
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Verify the target is not a protected PMC account. This holds for every
    /// caller, PMC included.
    async fn require_deletable(&self, email: &str) -> AppResult<()> {
        let query = Query::eq(collections::STAFF_STATE, "email", email);
        let target = self.documents.query(&query).await?;

        if let Some(doc) = target.first() {
            let record: StaffRecord = doc.decode()?;
            if record.role.is_some_and(StaffRole::is_protected) {
                return Err(AppError::Forbidden(
                    "PMC accounts cannot be deleted. They serve as super admin to maintain \
                     system access."
                        .to_string(),
                ));
            }
        }
        Ok(())
    }
}
