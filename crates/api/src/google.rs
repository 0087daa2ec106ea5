//! External identity provider verification.
//!
//! Login-time verification of a Google ID token against the provider's
//! `tokeninfo` endpoint. This is the only place the provider's signature is
//! actually checked; afterwards the `googletoken` cookie is decoded without
//! re-verification (see `fintrack_auth::token::decode_external`).

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use fintrack_auth::ExternalProfile;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, Error)]
pub enum VerifyError {
    /// The provider rejected the assertion (bad token, wrong audience, ...).
    #[error("invalid assertion: {0}")]
    Rejected(String),

    /// The verification endpoint was unreachable or timed out. Terminal for
    /// the request; the caller must re-initiate login.
    #[error("verification endpoint unavailable: {0}")]
    Network(String),
}

/// Verifies an opaque assertion from an external identity provider.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, assertion: &str) -> Result<ExternalProfile, VerifyError>;
}

/// Claims returned by Google's tokeninfo endpoint (strings throughout).
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// Google ID-token verifier backed by the tokeninfo endpoint.
pub struct GoogleTokenVerifier {
    http: reqwest::Client,
    client_id: Option<String>,
}

impl GoogleTokenVerifier {
    pub fn new(client_id: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
        }
    }
}

#[async_trait]
impl IdentityVerifier for GoogleTokenVerifier {
    async fn verify(&self, assertion: &str) -> Result<ExternalProfile, VerifyError> {
        let response = self
            .http
            .get(TOKENINFO_URL)
            .query(&[("id_token", assertion)])
            .send()
            .await
            .map_err(|e| VerifyError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VerifyError::Rejected(format!(
                "tokeninfo returned {}",
                response.status()
            )));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| VerifyError::Rejected(format!("unparseable tokeninfo: {e}")))?;

        if let Some(client_id) = &self.client_id {
            if info.aud != *client_id {
                return Err(VerifyError::Rejected("audience mismatch".into()));
            }
        }

        let name = info
            .name
            .ok_or_else(|| VerifyError::Rejected("assertion carries no name".into()))?;

        Ok(ExternalProfile {
            subject: info.sub,
            name,
            email: info.email,
            picture: info.picture,
        })
    }
}
