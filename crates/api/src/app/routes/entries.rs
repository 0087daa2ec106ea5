//! Income/expense CRUD.
//!
//! The income and expense handlers are thin twins over kind-parameterized
//! helpers; only creation differs (expense creation checks the account
//! exists, income creation does not, matching the observed behavior).

use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::Value;

use fintrack_core::EntryId;
use fintrack_ledger::EntryKind;

use crate::app::dto::{entry_to_json, EntryPatchRequest, EntryRequest};
use crate::app::errors::{domain_error_to_response, json_error, store_error_to_response};
use crate::app::services::AppServices;
use crate::context::RequestIdentity;

fn parse_id(raw: &str) -> Result<EntryId, Response> {
    raw.parse::<EntryId>().map_err(domain_error_to_response)
}

async fn list(services: &AppServices, identity: &RequestIdentity, kind: EntryKind) -> Response {
    match services.entries.list(kind, identity.username(), None).await {
        Ok(entries) => {
            let body: Vec<Value> = entries.iter().map(entry_to_json).collect();
            Json(body).into_response()
        }
        Err(e) => store_error_to_response(e),
    }
}

async fn create(
    services: &AppServices,
    identity: &RequestIdentity,
    kind: EntryKind,
    req: EntryRequest,
) -> Response {
    let draft = match req.into_draft() {
        Ok(draft) => draft,
        Err(e) => return domain_error_to_response(e),
    };
    let entry = match draft.into_entry(kind, identity.username()) {
        Ok(entry) => entry,
        Err(e) => return domain_error_to_response(e),
    };

    if let Err(e) = services.entries.insert(entry.clone()).await {
        return store_error_to_response(e);
    }

    tracing::debug!(kind = %kind, id = %entry.id, "entry created");
    (StatusCode::CREATED, Json(entry_to_json(&entry))).into_response()
}

async fn update(
    services: &AppServices,
    identity: &RequestIdentity,
    kind: EntryKind,
    raw_id: &str,
    req: EntryPatchRequest,
) -> Response {
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let patch = match req.into_patch() {
        Ok(patch) => patch,
        Err(e) => return domain_error_to_response(e),
    };

    match services.entries.update(kind, id, identity.username(), patch).await {
        Ok(entry) => Json(entry_to_json(&entry)).into_response(),
        Err(e) => store_error_to_response(e),
    }
}

async fn delete(
    services: &AppServices,
    identity: &RequestIdentity,
    kind: EntryKind,
    raw_id: &str,
) -> Response {
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.entries.delete(kind, id, identity.username()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error_to_response(e),
    }
}

// -------------------------
// Income
// -------------------------

pub async fn list_incomes(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
) -> Response {
    list(&services, &identity, EntryKind::Income).await
}

pub async fn create_income(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Json(req): Json<EntryRequest>,
) -> Response {
    create(&services, &identity, EntryKind::Income, req).await
}

pub async fn update_income(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
    Json(req): Json<EntryPatchRequest>,
) -> Response {
    update(&services, &identity, EntryKind::Income, &id, req).await
}

pub async fn delete_income(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> Response {
    delete(&services, &identity, EntryKind::Income, &id).await
}

// -------------------------
// Expense
// -------------------------

pub async fn list_expenses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
) -> Response {
    list(&services, &identity, EntryKind::Expense).await
}

pub async fn create_expense(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Json(req): Json<EntryRequest>,
) -> Response {
    // Expense creation requires the acting account to exist.
    match services.accounts.find_by_username(identity.username()).await {
        Ok(Some(_)) => {}
        Ok(None) => return json_error(StatusCode::NOT_FOUND, "not_found", "User not found"),
        Err(e) => return store_error_to_response(e),
    }

    create(&services, &identity, EntryKind::Expense, req).await
}

pub async fn update_expense(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
    Json(req): Json<EntryPatchRequest>,
) -> Response {
    update(&services, &identity, EntryKind::Expense, &id, req).await
}

pub async fn delete_expense(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> Response {
    delete(&services, &identity, EntryKind::Expense, &id).await
}
