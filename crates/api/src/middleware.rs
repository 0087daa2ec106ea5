use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use fintrack_auth::{resolve, CredentialError, SessionTokenCodec};

use crate::app::errors::json_error;
use crate::context::RequestIdentity;

pub const SESSION_COOKIE: &str = "token";
pub const GOOGLE_COOKIE: &str = "googletoken";

#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<SessionTokenCodec>,
}

/// Resolve the session cookies into a [`RequestIdentity`] before any handler
/// (and thus any store access) runs.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    let google_token = jar.get(GOOGLE_COOKIE).map(|c| c.value().to_string());

    match resolve(&state.codec, token.as_deref(), google_token.as_deref()) {
        Ok(identity) => {
            req.extensions_mut().insert(RequestIdentity(identity));
            next.run(req).await
        }
        Err(CredentialError::Missing) => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "no token provided")
        }
        Err(CredentialError::InvalidToken) => {
            json_error(StatusCode::FORBIDDEN, "forbidden", "invalid token")
        }
    }
}
