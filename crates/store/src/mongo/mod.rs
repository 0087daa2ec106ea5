//! MongoDB-backed stores (behind the `mongo` feature).
//!
//! Layout mirrors the original deployment: a `users` collection plus one
//! collection per entry kind (`incomes`, `expenses`). Uniqueness of `email`
//! and `google_id` is enforced by indexes; duplicate-key write errors are
//! surfaced as [`StoreError::Duplicate`] so the provisioning path can treat
//! them as "already exists".

use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::Client;

use crate::error::{StoreError, StoreResult};

pub mod accounts;
pub mod entries;

pub use accounts::MongoAccountStore;
pub use entries::MongoLedgerStore;

/// Connection handle shared by the Mongo stores.
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and ping the server once so a bad URI fails at startup, not on
    /// the first request.
    pub async fn connect(uri: &str, db_name: &str) -> StoreResult<Self> {
        tracing::info!(db = db_name, "connecting to MongoDB");

        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StoreError::backend(format!("mongodb connect: {e}")))?;

        client
            .database(db_name)
            .run_command(bson::doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::backend(format!("mongodb ping: {e}")))?;

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    pub(crate) fn database(&self) -> mongodb::Database {
        self.client.database(&self.db_name)
    }
}

pub(crate) fn backend(err: mongodb::error::Error) -> StoreError {
    StoreError::backend(err.to_string())
}

pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref we)) if we.code == 11000
    )
}
