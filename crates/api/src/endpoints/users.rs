//! User management endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use smartmess_common::AppResult;

use crate::{extractors::MaybeAuthCaller, middleware::AppState};

/// Delete user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    #[serde(default)]
    pub email: String,
}

/// Delete user response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserResponse {
    pub success: bool,
    pub message: String,
}

/// Delete a user's identity record by email.
async fn delete_user(
    State(state): State<AppState>,
    MaybeAuthCaller(caller): MaybeAuthCaller,
    Json(request): Json<DeleteUserRequest>,
) -> AppResult<Json<DeleteUserResponse>> {
    let outcome = state
        .user_deletion_service
        .delete_by_email(caller.as_ref(), &request.email)
        .await?;

    Ok(Json(DeleteUserResponse {
        success: outcome.success,
        message: outcome.message,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/delete", post(delete_user))
}
