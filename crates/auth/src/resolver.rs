//! Credential resolution: request cookies → acting identity.
//!
//! Every authenticated endpoint funnels through [`resolve`] instead of
//! repeating the cookie/JWT branching per handler. Resolution is a pure
//! function of the two cookie values and performs no I/O; no store access may
//! happen before it completes.

use thiserror::Error;

use crate::claims::ExternalClaims;
use crate::token::{decode_external, SessionTokenCodec};

/// Typed rejection from credential resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// Neither session cookie was present → respond 401.
    #[error("no token provided")]
    Missing,

    /// A cookie was present but its token failed verification/decoding
    /// → respond 403.
    #[error("invalid token")]
    InvalidToken,
}

/// The acting identity for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedIdentity {
    /// Signed session token; `username` is authoritative.
    Session { username: String },

    /// External-identity token. `name` doubles as the acting username;
    /// `email` is used where an endpoint looks accounts up by email.
    External { name: String, email: Option<String> },
}

impl ResolvedIdentity {
    /// The username this request acts as.
    pub fn username(&self) -> &str {
        match self {
            ResolvedIdentity::Session { username } => username,
            ResolvedIdentity::External { name, .. } => name,
        }
    }
}

/// Resolve the two session cookies into an identity.
///
/// The signed `token` cookie takes precedence: when present, a bad signature
/// is a terminal [`CredentialError::InvalidToken`] — it never falls through
/// to the external token. The external token's claims are decoded without
/// signature verification (see `token::decode_external`).
pub fn resolve(
    codec: &SessionTokenCodec,
    token: Option<&str>,
    google_token: Option<&str>,
) -> Result<ResolvedIdentity, CredentialError> {
    if let Some(token) = token {
        let claims = codec.verify(token).map_err(|_| CredentialError::InvalidToken)?;
        return Ok(ResolvedIdentity::Session {
            username: claims.username,
        });
    }

    if let Some(google_token) = google_token {
        let claims = decode_external(google_token).map_err(|_| CredentialError::InvalidToken)?;
        return external_identity(claims);
    }

    Err(CredentialError::Missing)
}

fn external_identity(claims: ExternalClaims) -> Result<ResolvedIdentity, CredentialError> {
    match claims.name {
        Some(name) => Ok(ResolvedIdentity::External {
            name,
            email: claims.email,
        }),
        // A nameless external token is unusable as an identity.
        None => Err(CredentialError::InvalidToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    fn codec() -> SessionTokenCodec {
        SessionTokenCodec::new(b"resolver-test-secret")
    }

    fn google_token(name: Option<&str>, email: Option<&str>) -> String {
        let claims = ExternalClaims {
            sub: Some("g-1".into()),
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            picture: None,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"not-checked"),
        )
        .unwrap()
    }

    #[test]
    fn no_cookies_is_missing() {
        assert_eq!(resolve(&codec(), None, None), Err(CredentialError::Missing));
    }

    #[test]
    fn signed_token_resolves_to_its_username() {
        let codec = codec();
        let token = codec.mint("alice").unwrap();
        let identity = resolve(&codec, Some(&token), None).unwrap();
        assert_eq!(identity.username(), "alice");
    }

    #[test]
    fn resolution_is_deterministic_for_the_same_cookie() {
        let codec = codec();
        let token = codec.mint("alice").unwrap();
        let a = resolve(&codec, Some(&token), None).unwrap();
        let b = resolve(&codec, Some(&token), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn tampered_signed_token_is_invalid_even_with_google_fallback_present() {
        // Precedence: a present-but-bad signed token never falls through.
        let google = google_token(Some("Alice"), None);
        let result = resolve(&codec(), Some("garbage.token.here"), Some(&google));
        assert_eq!(result, Err(CredentialError::InvalidToken));
    }

    #[test]
    fn google_token_resolves_to_claimed_name() {
        let google = google_token(Some("Alice"), Some("alice@example.com"));
        let identity = resolve(&codec(), None, Some(&google)).unwrap();
        assert_eq!(identity.username(), "Alice");
        assert_eq!(
            identity,
            ResolvedIdentity::External {
                name: "Alice".into(),
                email: Some("alice@example.com".into()),
            }
        );
    }

    #[test]
    fn nameless_google_token_is_invalid() {
        let google = google_token(None, Some("alice@example.com"));
        let result = resolve(&codec(), None, Some(&google));
        assert_eq!(result, Err(CredentialError::InvalidToken));
    }

    #[test]
    fn signed_token_wins_when_both_cookies_are_valid() {
        let codec = codec();
        let token = codec.mint("session-alice").unwrap();
        let google = google_token(Some("Google Alice"), None);
        let identity = resolve(&codec, Some(&token), Some(&google)).unwrap();
        assert_eq!(identity.username(), "session-alice");
    }
}
