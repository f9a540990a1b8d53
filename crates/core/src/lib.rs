//! Core business logic for smartmess.

pub mod services;

pub use services::*;
