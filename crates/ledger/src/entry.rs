//! Ledger entry model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fintrack_core::{DomainError, DomainResult, EntryId};

/// The two ledger record variants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }
}

impl core::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single income or expense record, owned by exactly one account
/// (by username). Updates are last-write-wins; there is no version field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub username: String,
    pub title: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub note: Option<String>,
}

/// Validated fields for creating a [`LedgerEntry`].
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub title: String,
    pub category: String,
    pub amount: Decimal,
    /// Defaults to creation time when omitted.
    pub date: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl EntryDraft {
    /// Validate and materialize an entry for `username`.
    pub fn into_entry(self, kind: EntryKind, username: &str) -> DomainResult<LedgerEntry> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title is required"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("category is required"));
        }
        if self.amount < Decimal::ZERO {
            return Err(DomainError::validation("amount must not be negative"));
        }

        Ok(LedgerEntry {
            id: EntryId::new(),
            kind,
            username: username.to_string(),
            title: self.title,
            category: self.category,
            amount: self.amount,
            date: self.date.unwrap_or_else(Utc::now),
            note: self.note,
        })
    }
}

/// Partial update for an entry; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.amount.is_none()
            && self.date.is_none()
            && self.note.is_none()
    }

    /// Validate the patch before applying it.
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(DomainError::validation("title must not be empty"));
            }
        }
        if let Some(category) = &self.category {
            if category.trim().is_empty() {
                return Err(DomainError::validation("category must not be empty"));
            }
        }
        if let Some(amount) = self.amount {
            if amount < Decimal::ZERO {
                return Err(DomainError::validation("amount must not be negative"));
            }
        }
        Ok(())
    }

    pub fn apply(&self, entry: &mut LedgerEntry) {
        if let Some(title) = &self.title {
            entry.title = title.clone();
        }
        if let Some(category) = &self.category {
            entry.category = category.clone();
        }
        if let Some(amount) = self.amount {
            entry.amount = amount;
        }
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(note) = &self.note {
            entry.note = Some(note.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn draft() -> EntryDraft {
        EntryDraft {
            title: "Salary".into(),
            category: "Salary".into(),
            amount: Decimal::new(2000, 0),
            date: None,
            note: None,
        }
    }

    #[test]
    fn draft_materializes_with_submitted_fields() {
        let entry = draft().into_entry(EntryKind::Income, "alice").unwrap();
        assert_eq!(entry.kind, EntryKind::Income);
        assert_eq!(entry.username, "alice");
        assert_eq!(entry.title, "Salary");
        assert_eq!(entry.amount, Decimal::new(2000, 0));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut d = draft();
        d.amount = Decimal::new(-1, 0);
        let err = d.into_entry(EntryKind::Expense, "alice").unwrap_err();
        assert!(matches!(err, fintrack_core::DomainError::Validation(_)));
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut d = draft();
        d.title = "  ".into();
        assert!(d.into_entry(EntryKind::Income, "alice").is_err());
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut entry = draft().into_entry(EntryKind::Expense, "alice").unwrap();
        let original_date = entry.date;

        let patch = EntryPatch {
            title: Some("Rent".into()),
            amount: Some(Decimal::new(950, 0)),
            ..Default::default()
        };
        patch.validate().unwrap();
        patch.apply(&mut entry);

        assert_eq!(entry.title, "Rent");
        assert_eq!(entry.amount, Decimal::new(950, 0));
        assert_eq!(entry.category, "Salary");
        assert_eq!(entry.date, original_date);
    }

    #[test]
    fn entry_json_uses_plain_numbers_for_amount() {
        let entry = draft().into_entry(EntryKind::Income, "alice").unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["amount"], serde_json::json!(2000.0));
        assert_eq!(json["kind"], "income");
    }
}
