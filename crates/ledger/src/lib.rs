//! `fintrack-ledger` — income/expense records and their date-window rules.

pub mod entry;
pub mod period;

pub use entry::{EntryDraft, EntryKind, EntryPatch, LedgerEntry};
pub use period::MonthWindow;
