//! `fintrack-auth` — authentication boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how
//! to hash passwords, mint/verify session tokens, decode external-identity
//! tokens, and resolve a request's cookies into an acting identity. It never
//! touches a store.

pub mod account;
pub mod claims;
pub mod password;
pub mod resolver;
pub mod token;

pub use account::{Account, ExternalProfile};
pub use claims::{ExternalClaims, SessionClaims};
pub use password::{hash_password, verify_password, PasswordError};
pub use resolver::{resolve, CredentialError, ResolvedIdentity};
pub use token::{decode_external, SessionTokenCodec, TokenError};
