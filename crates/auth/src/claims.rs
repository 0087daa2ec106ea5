//! Token claim models.

use serde::{Deserialize, Serialize};

/// Claims carried by the server-issued session token (`token` cookie).
///
/// There is deliberately no `exp` claim: the cookie's max-age is the only
/// lifetime bound the observed system enforces. See `resolver` for the
/// verification rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Display name of the signed-in account. Authoritative once the
    /// signature checks out.
    pub username: String,

    /// Issued-at (unix seconds). Informational only.
    pub iat: i64,
}

/// Claims we read out of an external-identity token (`googletoken` cookie).
///
/// These are decoded **without signature verification** on every request
/// after login — a known shortcut of the observed system, kept faithful here
/// and verified properly only at login time by the API's identity verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalClaims {
    /// Provider-scoped subject id.
    #[serde(default)]
    pub sub: Option<String>,

    /// Display name; required for a usable identity.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub picture: Option<String>,
}
