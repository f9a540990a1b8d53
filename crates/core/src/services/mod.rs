//! Business logic services.

pub mod auto_loop;
pub mod staff_cleanup;
pub mod user_deletion;

pub use auto_loop::{AutoLoopService, AutoLoopSummary};
pub use staff_cleanup::{StaffCleanupService, StaffDeletedEvent};
pub use user_deletion::{DeletionOutcome, UserDeletionService};
