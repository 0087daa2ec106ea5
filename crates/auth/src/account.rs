//! Account model.
//!
//! An account is created either on signup (with a password hash) or on first
//! external-identity login (with a `google_id` and no password). Nothing in
//! the observed behavior enforces the hash-XOR-external invariant, and we
//! deliberately keep it that way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fintrack_core::AccountId;

/// A user account.
///
/// `username` is a display name and is **not** guaranteed unique; `email` is
/// the unique lookup key for password signin, `google_id` for external
/// logins. `password_hash` carries an argon2id PHC string and must never be
/// exposed through the HTTP surface (the API layer projects accounts to JSON
/// without it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub profile_image: Option<String>,
    pub google_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Account created through the signup form.
    pub fn with_password(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: AccountId::new(),
            username,
            email,
            password_hash: Some(password_hash),
            profile_image: None,
            google_id: None,
            created_at: Utc::now(),
        }
    }

    /// Account provisioned on first external-identity login (no password).
    pub fn from_external(profile: &ExternalProfile) -> Self {
        Self {
            id: AccountId::new(),
            username: profile.name.clone(),
            email: profile.email.clone().unwrap_or_default(),
            password_hash: None,
            profile_image: profile.picture.clone(),
            google_id: Some(profile.subject.clone()),
            created_at: Utc::now(),
        }
    }
}

/// Verified profile extracted from an external identity provider's assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    /// Provider-scoped stable subject id (`sub`).
    pub subject: String,
    pub name: String,
    pub email: Option<String>,
    pub picture: Option<String>,
}
