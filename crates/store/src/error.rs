//! Store error model.
//!
//! Kept distinct from `DomainError` so handlers can tell "record missing"
//! apart from "backend unreachable" when mapping to HTTP responses and logs.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced record does not exist (or is not visible to the caller).
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("duplicate value for unique field `{0}`")]
    Duplicate(String),

    /// The backing store failed (connectivity, serialization, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn duplicate(field: impl Into<String>) -> Self {
        Self::Duplicate(field.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
