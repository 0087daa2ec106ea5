//! Mongo-backed ledger store (`incomes` / `expenses` collections).

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures_util::TryStreamExt;
use mongodb::options::ReturnDocument;
use mongodb::Collection;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fintrack_core::EntryId;
use fintrack_ledger::{EntryKind, EntryPatch, LedgerEntry, MonthWindow};

use crate::entries::LedgerStore;
use crate::error::{StoreError, StoreResult};
use crate::mongo::{backend, MongoClient};

/// Entry document; the kind is implied by the collection it lives in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryDoc {
    #[serde(rename = "_id")]
    id: String,
    username: String,
    title: String,
    category: String,
    amount: f64,
    date: bson::DateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl EntryDoc {
    fn from_entry(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            username: entry.username,
            title: entry.title,
            category: entry.category,
            amount: entry.amount.to_f64().unwrap_or(0.0),
            date: bson::DateTime::from_chrono(entry.date),
            note: entry.note,
        }
    }

    fn into_entry(self, kind: EntryKind) -> StoreResult<LedgerEntry> {
        let id: EntryId = self
            .id
            .parse()
            .map_err(|e| StoreError::backend(format!("bad entry id in store: {e}")))?;
        let amount = Decimal::try_from(self.amount)
            .map_err(|e| StoreError::backend(format!("bad amount in store: {e}")))?;

        Ok(LedgerEntry {
            id,
            kind,
            username: self.username,
            title: self.title,
            category: self.category,
            amount,
            date: self.date.to_chrono(),
            note: self.note,
        })
    }
}

pub struct MongoLedgerStore {
    incomes: Collection<EntryDoc>,
    expenses: Collection<EntryDoc>,
}

impl MongoLedgerStore {
    pub fn new(client: &MongoClient) -> Self {
        let db = client.database();
        Self {
            incomes: db.collection("incomes"),
            expenses: db.collection("expenses"),
        }
    }

    fn collection(&self, kind: EntryKind) -> &Collection<EntryDoc> {
        match kind {
            EntryKind::Income => &self.incomes,
            EntryKind::Expense => &self.expenses,
        }
    }
}

fn owner_filter(id: EntryId, username: &str) -> Document {
    doc! { "_id": id.to_string(), "username": username }
}

fn window_filter(window: &MonthWindow) -> Document {
    let end = Bson::DateTime(bson::DateTime::from_chrono(window.end));
    let mut range = doc! { "$gte": Bson::DateTime(bson::DateTime::from_chrono(window.start)) };
    if window.inclusive_end {
        range.insert("$lte", end);
    } else {
        range.insert("$lt", end);
    }
    doc! { "date": range }
}

fn set_document(patch: &EntryPatch) -> Document {
    let mut set = Document::new();
    if let Some(title) = &patch.title {
        set.insert("title", title);
    }
    if let Some(category) = &patch.category {
        set.insert("category", category);
    }
    if let Some(amount) = patch.amount {
        set.insert("amount", amount.to_f64().unwrap_or(0.0));
    }
    if let Some(date) = patch.date {
        set.insert("date", Bson::DateTime(bson::DateTime::from_chrono(date)));
    }
    if let Some(note) = &patch.note {
        set.insert("note", note);
    }
    set
}

#[async_trait]
impl LedgerStore for MongoLedgerStore {
    async fn insert(&self, entry: LedgerEntry) -> StoreResult<()> {
        let kind = entry.kind;
        self.collection(kind)
            .insert_one(EntryDoc::from_entry(entry))
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn list(
        &self,
        kind: EntryKind,
        username: &str,
        window: Option<MonthWindow>,
    ) -> StoreResult<Vec<LedgerEntry>> {
        let mut filter = doc! { "username": username };
        if let Some(window) = &window {
            filter.extend(window_filter(window));
        }

        let docs: Vec<EntryDoc> = self
            .collection(kind)
            .find(filter)
            .sort(doc! { "date": -1 })
            .await
            .map_err(backend)?
            .try_collect()
            .await
            .map_err(backend)?;

        docs.into_iter().map(|d| d.into_entry(kind)).collect()
    }

    async fn update(
        &self,
        kind: EntryKind,
        id: EntryId,
        username: &str,
        patch: EntryPatch,
    ) -> StoreResult<LedgerEntry> {
        let filter = owner_filter(id, username);

        // An all-absent patch has nothing to `$set`; just return the record.
        if patch.is_empty() {
            return self
                .collection(kind)
                .find_one(filter)
                .await
                .map_err(backend)?
                .ok_or(StoreError::NotFound)?
                .into_entry(kind);
        }

        self.collection(kind)
            .find_one_and_update(filter, doc! { "$set": set_document(&patch) })
            .return_document(ReturnDocument::After)
            .await
            .map_err(backend)?
            .ok_or(StoreError::NotFound)?
            .into_entry(kind)
    }

    async fn delete(&self, kind: EntryKind, id: EntryId, username: &str) -> StoreResult<()> {
        let result = self
            .collection(kind)
            .delete_one(owner_filter(id, username))
            .await
            .map_err(backend)?;

        if result.deleted_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
