//! HTTP API layer for smartmess.
//!
//! This crate provides the inbound trigger surfaces:
//!
//! - **Endpoints**: the callable user-deletion request and the staff-deleted
//!   event intake
//! - **Extractors**: verified caller identity
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
