//! Month windows for the filter/summary queries.
//!
//! The observed system uses two subtly different intervals derived from a
//! `(month, year)` pair, and we preserve both rather than guess which was
//! intended:
//!
//! - income filter: half-open `[first-of-month, first-of-next-month)`
//! - expense filter (and the combined summary): inclusive
//!   `[first-of-month, last-day-of-month 00:00]`
//!
//! Both satisfy the boundary requirement that e.g. `month=3, year=2024`
//! never matches an entry dated 2024-02-29.

use chrono::{DateTime, TimeZone, Utc};

use fintrack_core::{DomainError, DomainResult};

use crate::entry::EntryKind;

/// A date window over one calendar month.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Whether `end` itself is inside the window.
    pub inclusive_end: bool,
}

impl MonthWindow {
    /// Half-open window covering the whole month: `[start, next-month)`.
    pub fn half_open(year: i32, month: u32) -> DomainResult<Self> {
        let start = month_start(year, month)?;
        let end = next_month_start(year, month)?;
        Ok(Self {
            start,
            end,
            inclusive_end: false,
        })
    }

    /// Inclusive window ending at midnight of the month's last day:
    /// `[start, last-day 00:00]`.
    pub fn inclusive(year: i32, month: u32) -> DomainResult<Self> {
        let start = month_start(year, month)?;
        let end = next_month_start(year, month)? - chrono::Duration::days(1);
        Ok(Self {
            start,
            end,
            inclusive_end: true,
        })
    }

    /// The window the filter endpoint applies for entries of `kind`.
    pub fn for_kind(kind: EntryKind, year: i32, month: u32) -> DomainResult<Self> {
        match kind {
            EntryKind::Income => Self::half_open(year, month),
            EntryKind::Expense => Self::inclusive(year, month),
        }
    }

    /// The window the combined summary applies to both kinds.
    pub fn for_summary(year: i32, month: u32) -> DomainResult<Self> {
        Self::inclusive(year, month)
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        if date < self.start {
            return false;
        }
        if self.inclusive_end {
            date <= self.end
        } else {
            date < self.end
        }
    }
}

fn month_start(year: i32, month: u32) -> DomainResult<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| DomainError::validation(format!("invalid month/year: {month}/{year}")))
}

fn next_month_start(year: i32, month: u32) -> DomainResult<DateTime<Utc>> {
    let (y, m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    month_start(y, m)
}
