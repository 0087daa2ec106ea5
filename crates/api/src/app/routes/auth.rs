//! Signup, signin, external-identity login, logout.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;

use fintrack_auth::{hash_password, verify_password, Account};
use fintrack_store::find_or_create_external;

use crate::app::dto::{account_to_json, GoogleLoginRequest, SigninRequest, SignupRequest};
use crate::app::errors::{json_error, store_error_to_response, verify_error_to_response};
use crate::app::services::AppServices;
use crate::middleware::{GOOGLE_COOKIE, SESSION_COOKIE};

const SESSION_TTL_DAYS: i64 = 7;

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::days(SESSION_TTL_DAYS))
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> Response {
    if req.username.trim().is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", "Username is required");
    }
    if !req.email.contains('@') {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", "Invalid email");
    }
    if req.password.len() < 6 {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Password must be at least 6 characters",
        );
    }
    if req.password != req.confirm_password {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", "Passwords do not match");
    }

    let hash = match hash_password(&req.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "password hashing failed");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal server error");
        }
    };

    let account = Account::with_password(req.username, req.email, hash);
    if let Err(e) = services.accounts.insert(account.clone()).await {
        return store_error_to_response(e);
    }

    let token = match services.codec.mint(&account.username) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "token minting failed");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal server error");
        }
    };

    tracing::info!(username = %account.username, "account created");
    let body = Json(json!({
        "message": "User registered successfully",
        "token": token,
        "user": account_to_json(&account),
    }));
    (StatusCode::CREATED, jar.add(session_cookie(token)), body).into_response()
}

pub async fn signin(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    Json(req): Json<SigninRequest>,
) -> Response {
    let account = match services.accounts.find_by_email(&req.email).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            return json_error(StatusCode::BAD_REQUEST, "validation_error", "Username not found")
        }
        Err(e) => return store_error_to_response(e),
    };

    // Externally-provisioned accounts have no password to check.
    let Some(hash) = account.password_hash.as_deref() else {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", "Incorrect password");
    };

    match verify_password(&req.password, hash) {
        Ok(true) => {}
        Ok(false) => {
            return json_error(StatusCode::BAD_REQUEST, "validation_error", "Incorrect password")
        }
        Err(e) => {
            tracing::error!(error = %e, "password verification failed");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal server error");
        }
    }

    let token = match services.codec.mint(&account.username) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "token minting failed");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal server error");
        }
    };

    let body = Json(json!({
        "message": "Login successful",
        "token": token,
        "username": account.username,
        "user": account_to_json(&account),
    }));
    (StatusCode::OK, jar.add(session_cookie(token)), body).into_response()
}

/// Verify a Google ID token and provision an account on first sight. The
/// client keeps the verified token in its own `googletoken` cookie; no
/// server-side session cookie is set here.
pub async fn google_login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<GoogleLoginRequest>,
) -> Response {
    let profile = match services.verifier.verify(&req.token).await {
        Ok(profile) => profile,
        Err(e) => return verify_error_to_response(e),
    };

    let account = match find_or_create_external(services.accounts.as_ref(), &profile).await {
        Ok(account) => account,
        Err(e) => return store_error_to_response(e),
    };

    tracing::info!(username = %account.username, "external login");
    let body = Json(json!({
        "message": "User authenticated successfully",
        "user": account_to_json(&account),
    }));
    (StatusCode::OK, body).into_response()
}

pub async fn logout(jar: CookieJar) -> Response {
    let jar = jar
        .remove(removal_cookie(SESSION_COOKIE))
        .remove(removal_cookie(GOOGLE_COOKIE));
    (StatusCode::NO_CONTENT, jar).into_response()
}
