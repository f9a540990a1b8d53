//! Document-deletion event intake.
//!
//! The document store delivers a deleted document's prior field values plus
//! its key. The reactor has no caller to report to, so this surface always
//! acknowledges with `204`.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;
use smartmess_core::StaffDeletedEvent;
use smartmess_store::StaffRole;

use crate::{middleware::AppState, response};

/// Staff document deletion payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffDeletedRequest {
    /// Key of the deleted document.
    pub staff_id: String,
    /// Prior email field, if the document had one.
    #[serde(default)]
    pub email: Option<String>,
    /// Prior role field, if the document had one.
    #[serde(default)]
    pub role: Option<StaffRole>,
}

/// React to a deleted staff document.
async fn staff_deleted(
    State(state): State<AppState>,
    Json(request): Json<StaffDeletedRequest>,
) -> impl IntoResponse {
    let event = StaffDeletedEvent {
        staff_id: request.staff_id,
        email: request.email,
        role: request.role,
    };

    state.staff_cleanup_service.handle_staff_deleted(&event).await;
    response::ok()
}

pub fn router() -> Router<AppState> {
    Router::new().route("/staff-deleted", post(staff_deleted))
}
