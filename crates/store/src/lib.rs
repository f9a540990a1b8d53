//! External store clients for smartmess.
//!
//! This crate wraps the two external collaborators everything else depends on:
//!
//! - **Identity store**: the authentication provider owning [`IdentityRecord`]s,
//!   via [`IdentityStore`]
//! - **Document store**: the document database holding staff, mirror,
//!   preference and meal-state documents, via [`DocumentStore`]
//!
//! Each store is a trait with a production HTTP backend and an in-memory
//! backend. The in-memory backends keep full query and batched-write semantics
//! and double as test doubles for the service layer.

pub mod collections;
pub mod documents;
pub mod identity;
pub mod memory;
pub mod models;

pub use documents::{Document, DocumentStore, HttpDocumentStore, Query, WriteBatch, WriteOp};
pub use identity::{CallerIdentity, HttpIdentityStore, IdentityRecord, IdentityStore};
pub use memory::{MemoryDocumentStore, MemoryIdentityStore};
pub use models::{AutoLoopPreference, MealEntry, MealPattern, StaffRecord, StaffRole};
