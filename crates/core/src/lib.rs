//! `fintrack-core` — shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no HTTP, no storage).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{AccountId, EntryId};
