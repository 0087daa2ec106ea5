//! Current-user lookup and profile image upload.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::json;

use fintrack_auth::ResolvedIdentity;
use fintrack_store::StoreError;

use crate::app::dto::account_to_json;
use crate::app::errors::{json_error, store_error_to_response};
use crate::app::services::AppServices;
use crate::context::RequestIdentity;

/// Resolve the acting identity to its account.
///
/// Session identities are looked up by username; external identities carry
/// no authoritative username, so they are looked up by the email claim.
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
) -> Response {
    let found = match identity.identity() {
        ResolvedIdentity::Session { username } => {
            services.accounts.find_by_username(username).await
        }
        ResolvedIdentity::External { email: Some(email), .. } => {
            services.accounts.find_by_email(email).await
        }
        ResolvedIdentity::External { email: None, .. } => Ok(None),
    };

    match found {
        Ok(Some(account)) => Json(account_to_json(&account)).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "not_found", "User not found"),
        Err(e) => store_error_to_response(e),
    }
}

/// Accept a multipart `profileImage` upload, write it under the upload
/// directory, and record its public URL on the account.
pub async fn upload_image(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    mut multipart: Multipart,
) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    format!("malformed multipart body: {e}"),
                )
            }
        };

        if field.name() != Some("profileImage") {
            continue;
        }

        let extension = field
            .file_name()
            .and_then(|name| FsPath::new(name).extension())
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin")
            .to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    format!("unreadable upload: {e}"),
                )
            }
        };

        let filename = format!("{}.{extension}", Utc::now().timestamp_millis());
        let path = services.config.upload_dir.join(&filename);

        if let Err(e) = tokio::fs::create_dir_all(&services.config.upload_dir).await {
            tracing::error!(error = %e, "cannot create upload directory");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal server error");
        }
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            tracing::error!(error = %e, path = %path.display(), "cannot write upload");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal server error");
        }

        let url = format!("{}/uploads/{filename}", services.config.public_base_url);
        return match services
            .accounts
            .set_profile_image(identity.username(), &url)
            .await
        {
            Ok(()) => Json(json!({ "url": url })).into_response(),
            Err(StoreError::NotFound) => {
                json_error(StatusCode::NOT_FOUND, "not_found", "User not found")
            }
            Err(e) => store_error_to_response(e),
        };
    }

    json_error(
        StatusCode::BAD_REQUEST,
        "validation_error",
        "profileImage field is required",
    )
}
