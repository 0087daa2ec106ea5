//! Request DTOs and JSON mapping helpers.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use fintrack_auth::Account;
use fintrack_core::{DomainError, DomainResult};
use fintrack_ledger::{EntryDraft, EntryPatch, LedgerEntry};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub title: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: Option<String>,
    pub note: Option<String>,
}

impl EntryRequest {
    pub fn into_draft(self) -> DomainResult<EntryDraft> {
        let date = self.date.as_deref().map(parse_entry_date).transpose()?;
        Ok(EntryDraft {
            title: self.title,
            category: self.category,
            amount: self.amount,
            date,
            note: self.note,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct EntryPatchRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    pub date: Option<String>,
    pub note: Option<String>,
}

impl EntryPatchRequest {
    pub fn into_patch(self) -> DomainResult<EntryPatch> {
        let date = self.date.as_deref().map(parse_entry_date).transpose()?;
        let patch = EntryPatch {
            title: self.title,
            category: self.category,
            amount: self.amount,
            date,
            note: self.note,
        };
        patch.validate()?;
        Ok(patch)
    }
}

/// `month`/`year` query parameters shared by the filter and summary routes.
#[derive(Debug, Deserialize, Default)]
pub struct MonthQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl MonthQuery {
    /// Both parameters present, or no filtering at all (matching the
    /// observed behavior where a lone `month` or `year` is ignored).
    pub fn as_pair(&self) -> Option<(i32, u32)> {
        match (self.year, self.month) {
            (Some(year), Some(month)) => Some((year, month)),
            _ => None,
        }
    }
}

/// Accept RFC 3339 or a bare `YYYY-MM-DD` (interpreted as midnight UTC).
pub fn parse_entry_date(raw: &str) -> DomainResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(DomainError::validation(format!("unparseable date: {raw}")))
}

// -------------------------
// JSON projections
// -------------------------

/// Account JSON as exposed to clients. The password hash is never included.
pub fn account_to_json(account: &Account) -> Value {
    json!({
        "id": account.id.to_string(),
        "username": account.username,
        "email": account.email,
        "profilePic": account.profile_image,
        "googleId": account.google_id,
        "createdAt": account.created_at.to_rfc3339(),
    })
}

pub fn entry_to_json(entry: &LedgerEntry) -> Value {
    json!({
        "id": entry.id.to_string(),
        "kind": entry.kind.as_str(),
        "username": entry.username,
        "title": entry.title,
        "category": entry.category,
        "amount": entry.amount.to_f64().unwrap_or(0.0),
        "date": entry.date.to_rfc3339(),
        "note": entry.note,
    })
}
