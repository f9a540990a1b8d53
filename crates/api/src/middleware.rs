//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use smartmess_core::{StaffCleanupService, UserDeletionService};
use smartmess_store::{CallerIdentity, IdentityStore};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_deletion_service: UserDeletionService,
    pub staff_cleanup_service: StaffCleanupService,
    pub identity: Arc<dyn IdentityStore>,
}

/// Authentication middleware.
///
/// Resolves a bearer token to a [`CallerIdentity`] through the identity
/// store and attaches it to the request. Requests without a valid token pass
/// through unauthenticated; each endpoint decides whether that is an error.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.identity.verify_token(token).await {
            Ok(Some(caller)) => {
                req.extensions_mut().insert(caller);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Token verification failed, treating as anonymous");
            }
        }
    }

    next.run(req).await
}
