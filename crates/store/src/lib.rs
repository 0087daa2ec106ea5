//! `fintrack-store` — persistence boundary.
//!
//! Store traits plus two implementations: in-memory (dev/test) and MongoDB
//! behind the `mongo` cargo feature. Both expose document-level atomicity
//! only; there are no cross-document transactions.

pub mod accounts;
pub mod entries;
pub mod error;

#[cfg(feature = "mongo")]
pub mod mongo;

pub use accounts::{find_or_create_external, AccountStore, InMemoryAccountStore};
pub use entries::{InMemoryLedgerStore, LedgerStore};
pub use error::{StoreError, StoreResult};
