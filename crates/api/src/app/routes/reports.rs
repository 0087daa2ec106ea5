//! Month filters, the combined summary, and the savings view.

use std::sync::Arc;

use axum::extract::Query;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::{json, Value};

use fintrack_ledger::{EntryKind, MonthWindow};

use crate::app::dto::{entry_to_json, MonthQuery};
use crate::app::errors::{domain_error_to_response, store_error_to_response};
use crate::app::services::AppServices;
use crate::context::RequestIdentity;

async fn filter(
    services: &AppServices,
    identity: &RequestIdentity,
    kind: EntryKind,
    query: MonthQuery,
) -> Response {
    let window = match query.as_pair() {
        Some((year, month)) => match MonthWindow::for_kind(kind, year, month) {
            Ok(window) => Some(window),
            Err(e) => return domain_error_to_response(e),
        },
        None => None,
    };

    match services.entries.list(kind, identity.username(), window).await {
        Ok(entries) => {
            let body: Vec<Value> = entries.iter().map(entry_to_json).collect();
            Json(body).into_response()
        }
        Err(e) => store_error_to_response(e),
    }
}

pub async fn filter_incomes(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Query(query): Query<MonthQuery>,
) -> Response {
    filter(&services, &identity, EntryKind::Income, query).await
}

pub async fn filter_expenses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Query(query): Query<MonthQuery>,
) -> Response {
    filter(&services, &identity, EntryKind::Expense, query).await
}

/// Incomes and expenses side by side, optionally for one month. Unlike the
/// per-kind filters, the summary uses the inclusive month window for both
/// kinds.
pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Query(query): Query<MonthQuery>,
) -> Response {
    let window = match query.as_pair() {
        Some((year, month)) => match MonthWindow::for_summary(year, month) {
            Ok(window) => Some(window),
            Err(e) => return domain_error_to_response(e),
        },
        None => None,
    };

    both_kinds(&services, &identity, window).await
}

/// Full unfiltered ledger for the savings view.
pub async fn savings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
) -> Response {
    both_kinds(&services, &identity, None).await
}

async fn both_kinds(
    services: &AppServices,
    identity: &RequestIdentity,
    window: Option<MonthWindow>,
) -> Response {
    let username = identity.username();
    let (incomes, expenses) = tokio::join!(
        services.entries.list(EntryKind::Income, username, window),
        services.entries.list(EntryKind::Expense, username, window),
    );

    let incomes = match incomes {
        Ok(entries) => entries,
        Err(e) => return store_error_to_response(e),
    };
    let expenses = match expenses {
        Ok(entries) => entries,
        Err(e) => return store_error_to_response(e),
    };

    Json(json!({
        "incomes": incomes.iter().map(entry_to_json).collect::<Vec<_>>(),
        "expenses": expenses.iter().map(entry_to_json).collect::<Vec<_>>(),
    }))
    .into_response()
}
