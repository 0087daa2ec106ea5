//! Consistent JSON error responses.
//!
//! Error kinds stay distinct all the way to this boundary so "record
//! missing" and "backend unreachable" map (and log) differently instead of
//! collapsing into one generic 500.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use fintrack_core::DomainError;
use fintrack_store::StoreError;

use crate::google::VerifyError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Duplicate(field) => json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("{field} already registered"),
        ),
        StoreError::Backend(msg) => {
            tracing::error!(error = %msg, "store backend failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal server error")
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

pub fn verify_error_to_response(err: VerifyError) -> axum::response::Response {
    match &err {
        VerifyError::Rejected(reason) => {
            tracing::warn!(reason, "external assertion rejected");
        }
        VerifyError::Network(reason) => {
            tracing::error!(reason, "identity verification endpoint unreachable");
        }
    }
    // Both are terminal for the login attempt; the client must re-initiate.
    json_error(StatusCode::UNAUTHORIZED, "invalid_assertion", "Invalid token")
}
