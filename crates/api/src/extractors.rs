//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use smartmess_store::CallerIdentity;

/// Optional authenticated caller extractor.
///
/// Yields `None` when the request carried no valid bearer token, leaving the
/// endpoint to decide how missing authentication ranks against its other
/// argument checks.
#[derive(Debug, Clone)]
pub struct MaybeAuthCaller(pub Option<CallerIdentity>);

impl<S> FromRequestParts<S> for MaybeAuthCaller
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<CallerIdentity>().cloned()))
    }
}
